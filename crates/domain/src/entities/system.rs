//! RPG system - the reusable sheet template a character is built from

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Field;
use crate::error::DomainError;
use crate::ids::{SystemId, UserId};
use crate::value_objects::{validate_formula, DiceFormulaError};

/// A game system: an ordered field-definition list plus display metadata.
///
/// Field definitions are created and edited only here; characters copy
/// them at creation time and never share instances with the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpgSystem {
    pub id: SystemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
    /// Ordered field definitions
    #[serde(default)]
    pub template: Vec<Field>,
    /// Explicit display order for categories; may cover only a subset
    #[serde(default)]
    pub category_order: Vec<String>,
    /// Obsolete systems are hidden from pickers but keep their characters
    #[serde(default)]
    pub obsolete: bool,
}

impl RpgSystem {
    pub fn new(name: impl Into<String>, owner_id: UserId) -> Self {
        Self {
            id: SystemId::new(),
            name: name.into(),
            description: String::new(),
            owner_id,
            created_at: Utc::now(),
            template: Vec::new(),
            category_order: Vec::new(),
            obsolete: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.template.push(field);
        self
    }

    pub fn with_category_order(mut self, order: impl Into<Vec<String>>) -> Self {
        self.category_order = order.into();
        self
    }

    /// Find a field definition by name.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.template.iter().find(|f| f.name == name)
    }

    /// Check the structural invariants of the template.
    ///
    /// Expression resolution and dice substitution are name-keyed, so
    /// field names must be non-empty and unique within the list. Enabled
    /// roll formulas must match the dice grammar. Run this before saving
    /// a system.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("System name cannot be empty"));
        }
        let mut seen = HashSet::new();
        for field in &self.template {
            if field.name.is_empty() {
                return Err(DomainError::validation("Field name cannot be empty"));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(DomainError::constraint(format!(
                    "Duplicate field name: {}",
                    field.name
                )));
            }
            if let Some(rollable) = &field.rollable {
                if rollable.enabled && !validate_formula(&rollable.formula) {
                    return Err(DiceFormulaError::Malformed(rollable.formula.clone()).into());
                }
            }
        }
        Ok(())
    }

    /// Seed the field list for a new character of this system.
    ///
    /// Deep copy of the template with per-instance state reset: the seed
    /// value is kept, and nothing starts out user-edited.
    pub fn instantiate(&self) -> Vec<Field> {
        self.template
            .iter()
            .map(|definition| Field {
                edited: false,
                ..definition.clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ComponentType;

    #[test]
    fn instantiate_copies_fields_and_resets_edited() {
        let mut definition = Field::new("Strength", "10").with_component(ComponentType::Numeric);
        definition.edited = true;

        let system = RpgSystem::new("Test System", UserId::new()).with_field(definition);
        let fields = system.instantiate();

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "10");
        assert!(!fields[0].edited);
        // The template definition is untouched
        assert!(system.template[0].edited);
    }

    #[test]
    fn validate_accepts_a_well_formed_template() {
        let system = RpgSystem::new("Test", UserId::new())
            .with_field(Field::new("Strength", "14"))
            .with_field(Field::new("Attack", "").with_rollable("1d20 + {Strength}"));

        assert!(system.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_field_names() {
        let system = RpgSystem::new("Test", UserId::new())
            .with_field(Field::new("HP", "8"))
            .with_field(Field::new("HP", "10"));

        assert!(matches!(
            system.validate(),
            Err(crate::error::DomainError::Constraint(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_names() {
        let system = RpgSystem::new("   ", UserId::new());
        assert!(matches!(
            system.validate(),
            Err(crate::error::DomainError::Validation(_))
        ));

        let system = RpgSystem::new("Test", UserId::new()).with_field(Field::new("", "1"));
        assert!(matches!(
            system.validate(),
            Err(crate::error::DomainError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_malformed_roll_formulas() {
        let system = RpgSystem::new("Test", UserId::new())
            .with_field(Field::new("Attack", "").with_rollable("2d"));

        assert!(matches!(
            system.validate(),
            Err(crate::error::DomainError::Dice(DiceFormulaError::Malformed(_)))
        ));
    }

    #[test]
    fn get_field_is_name_keyed() {
        let system = RpgSystem::new("Test", UserId::new())
            .with_field(Field::new("HP", "8"))
            .with_field(Field::new("AC", "12"));

        assert_eq!(system.get_field("AC").map(|f| f.value.as_str()), Some("12"));
        assert!(system.get_field("Missing").is_none());
    }
}
