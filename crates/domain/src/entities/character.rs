//! Character - a filled-in instance of a system template

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Field, RpgSystem};
use crate::error::DomainError;
use crate::expressions::resolver;
use crate::ids::{CharacterId, SystemId, UserId};
use crate::value_objects::{DiceRollResult, DieRoller};

/// A character sheet: a deep copy of a system's template plus the
/// per-field mutations made since.
///
/// Field instances are mutated only by direct user edits (which set the
/// `edited` flag) and by the expression resolver (which only ever touches
/// non-edited, expression-bearing fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub system_id: SystemId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub data: Vec<Field>,
}

impl Character {
    /// Create a character seeded from a system template, with all
    /// expressions resolved once.
    pub fn from_system(system: &RpgSystem, name: impl Into<String>, user_id: UserId) -> Self {
        let mut character = Self {
            id: CharacterId::new(),
            system_id: system.id,
            user_id,
            created_at: Utc::now(),
            name: name.into(),
            data: system.instantiate(),
        };
        character.recalculate();
        character
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.data.iter().find(|f| f.name == name)
    }

    /// Apply a direct user edit and recompute derived fields.
    ///
    /// Marks the field as edited, which makes it a terminal node for the
    /// resolver from now on. Returns false if the field does not exist.
    pub fn set_field_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        let Some(field) = self.data.iter_mut().find(|f| f.name == name) else {
            return false;
        };
        field.value = value.into();
        field.edited = true;
        self.recalculate();
        true
    }

    /// Hand a field back to the resolver.
    ///
    /// Clears the edited flag so the next recalculation recomputes the
    /// field from its expression. Returns false if the field does not
    /// exist.
    pub fn reset_field(&mut self, name: &str) -> bool {
        let Some(field) = self.data.iter_mut().find(|f| f.name == name) else {
            return false;
        };
        field.edited = false;
        self.recalculate();
        true
    }

    /// Run the expression resolver over the whole field list.
    pub fn recalculate(&mut self) {
        self.data = resolver::calculate_expressions(&self.data);
    }

    /// Snapshot of current field values, fed to the dice engine.
    pub fn field_values(&self) -> HashMap<String, String> {
        self.data
            .iter()
            .filter(|f| !f.name.is_empty())
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    /// Roll a field's dice formula against the current snapshot.
    ///
    /// Fails with `NotFound` for a missing field, `Constraint` for a
    /// field without an enabled roll configuration, and the engine's own
    /// error for a malformed formula.
    pub fn roll_field(
        &self,
        name: &str,
        roller: &mut dyn DieRoller,
    ) -> Result<DiceRollResult, DomainError> {
        let field = self
            .get_field(name)
            .ok_or_else(|| DomainError::not_found("Field", name))?;
        let rollable = field
            .rollable
            .as_ref()
            .filter(|r| r.enabled)
            .ok_or_else(|| DomainError::constraint(format!("Field is not rollable: {name}")))?;
        Ok(crate::value_objects::roll_formula(
            &rollable.formula,
            &self.field_values(),
            roller,
        )?)
    }
}
