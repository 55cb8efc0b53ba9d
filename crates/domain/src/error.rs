//! Unified error types for the domain layer
//!
//! Data-shaped problems (bad formulas, missing references, cycles) are
//! handled inside the engines and never surface here; this type covers the
//! operations that do fail, such as structural validation.

use thiserror::Error;

use crate::value_objects::DiceFormulaError;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Dice formula rejected by the roll engine
    #[error(transparent)]
    Dice(#[from] DiceFormulaError),
}

impl DomainError {
    /// Create a validation error for business rule violations
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }
}
