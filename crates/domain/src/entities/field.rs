//! Sheet field schema types
//!
//! A [`Field`] is the unit of data on a system template or a character
//! sheet: a named, typed slot that may carry a formula (`expression`) over
//! other fields and/or a dice roll configuration (`rollable`). Values are
//! carried as strings on the wire; numbers and booleans are coerced at the
//! evaluator and roll-engine boundaries only.

use serde::{Deserialize, Serialize};

/// Category used when a field does not declare one.
pub const DEFAULT_CATEGORY: &str = "General";

/// UI component used to render a field.
///
/// Opaque to the resolver and roll engine; only used to pick default
/// preview values when a template is displayed without character data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    #[default]
    Text,
    Numeric,
    Textarea,
    Select,
    Checkbox,
    Radio,
}

/// Dice roll configuration attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollConfig {
    /// Whether the field offers a roll button
    #[serde(default)]
    pub enabled: bool,
    /// Dice formula, may reference other fields as `{name}` tokens
    #[serde(default)]
    pub formula: String,
}

/// How the expression resolver treats a field.
///
/// Explicit classification of what the original data model expressed
/// through the `edited` flag: user input always wins over a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Input node: the resolver reads its value but never writes it
    Terminal,
    /// Derived node: the resolver recomputes its value from `expression`
    Computed,
}

/// A single field on a template or character sheet.
///
/// Field names are unique within one list; resolution and substitution are
/// name-keyed. The serde names match the document-store schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Unique name within the field list; used as the substitution token
    pub name: String,
    /// Current value; numbers and booleans are carried as strings
    #[serde(default)]
    pub value: String,
    /// Dice roll configuration, if the field is rollable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollable: Option<RollConfig>,
    /// Formula referencing other fields as `{name}` tokens; empty = none
    #[serde(default)]
    pub expression: String,
    /// Whether players may edit the field on the sheet
    #[serde(default)]
    pub editable: bool,
    /// Set on direct user input; a true value locks out the resolver
    #[serde(default)]
    pub edited: bool,
    /// Whether the field may be edited during a live session
    #[serde(default)]
    pub session_editable: bool,
    /// Hidden fields are skipped by the category organizer
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Display grouping key; empty falls back to [`DEFAULT_CATEGORY`]
    #[serde(default)]
    pub category: String,
    /// Rendering component
    #[serde(default)]
    pub component: ComponentType,
    /// Tie-breaker for ordering within a category
    #[serde(default)]
    pub order: i32,
    /// Choices for select/radio components
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Field {
    /// Create a plain field with a name and value, defaults elsewhere.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            rollable: None,
            expression: String::new(),
            editable: true,
            edited: false,
            session_editable: false,
            visible: true,
            category: String::new(),
            component: ComponentType::default(),
            order: 0,
            options: Vec::new(),
        }
    }

    /// Create a derived field with an expression over other fields.
    pub fn derived(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            editable: false,
            ..Self::new(name, "")
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_component(mut self, component: ComponentType) -> Self {
        self.component = component;
        self
    }

    pub fn with_rollable(mut self, formula: impl Into<String>) -> Self {
        self.rollable = Some(RollConfig {
            enabled: true,
            formula: formula.into(),
        });
        self
    }

    /// How the expression resolver must treat this field.
    ///
    /// A field with no expression is always terminal, and user-edited
    /// fields stay terminal until the edit flag is explicitly reset.
    pub fn role(&self) -> FieldRole {
        if self.expression.is_empty() || self.edited {
            FieldRole::Terminal
        } else {
            FieldRole::Computed
        }
    }

    /// Names of the fields referenced by this field's expression.
    ///
    /// These are the dependency edges the resolver walks; an empty list
    /// means the expression (if any) is already fully concrete.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.expression.as_str();
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start + 1..].find('}') else {
                break;
            };
            let name = &rest[start + 1..start + 1 + len];
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
            rest = &rest[start + 1 + len + 1..];
        }
        names
    }

    /// Category used for display grouping.
    pub fn display_category(&self) -> &str {
        if self.category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            &self.category
        }
    }

    /// Placeholder value shown when previewing a template without data.
    pub fn preview_value(&self) -> String {
        match self.component {
            ComponentType::Numeric => self.value_or("0"),
            ComponentType::Checkbox => self.value_or("false"),
            // Selects render their placeholder option in preview mode
            ComponentType::Select => String::new(),
            ComponentType::Textarea => {
                self.value_or("This is a sample of longer text shown in preview.")
            }
            ComponentType::Text | ComponentType::Radio => self.value_or("Sample"),
        }
    }

    fn value_or(&self, fallback: &str) -> String {
        if self.value.is_empty() {
            fallback.to_string()
        } else {
            self.value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_without_expression_is_terminal() {
        let field = Field::new("Strength", "14");
        assert_eq!(field.role(), FieldRole::Terminal);
    }

    #[test]
    fn field_with_expression_is_computed() {
        let field = Field::derived("Modifier", "floor(({Strength}-10)/2)");
        assert_eq!(field.role(), FieldRole::Computed);
    }

    #[test]
    fn edited_field_is_terminal_even_with_expression() {
        let mut field = Field::derived("Modifier", "{Strength}*2");
        field.edited = true;
        assert_eq!(field.role(), FieldRole::Terminal);
    }

    #[test]
    fn referenced_fields_are_extracted_in_order() {
        let field = Field::derived("Total", "{A} + {B} * {A}");
        assert_eq!(field.referenced_fields(), vec!["A", "B"]);
    }

    #[test]
    fn referenced_fields_ignores_unclosed_token() {
        let field = Field::derived("Broken", "{A} + {B");
        assert_eq!(field.referenced_fields(), vec!["A"]);
    }

    #[test]
    fn display_category_falls_back_to_general() {
        assert_eq!(Field::new("HP", "10").display_category(), DEFAULT_CATEGORY);
        assert_eq!(
            Field::new("HP", "10").with_category("Combat").display_category(),
            "Combat"
        );
    }

    #[test]
    fn preview_values_per_component() {
        let numeric = Field::new("AC", "").with_component(ComponentType::Numeric);
        assert_eq!(numeric.preview_value(), "0");

        let checkbox = Field::new("Inspired", "").with_component(ComponentType::Checkbox);
        assert_eq!(checkbox.preview_value(), "false");

        let select = Field::new("Class", "Wizard").with_component(ComponentType::Select);
        assert_eq!(select.preview_value(), "");

        let text = Field::new("Name", "");
        assert_eq!(text.preview_value(), "Sample");
    }

    #[test]
    fn serde_wire_names_are_camel_case() {
        let field = Field::new("HP", "10").with_rollable("1d20");
        let json = serde_json::to_value(&field).expect("serializes");
        assert!(json.get("sessionEditable").is_some());
        assert_eq!(json["rollable"]["enabled"], true);
    }

    #[test]
    fn visible_defaults_to_true_when_missing() {
        let field: Field = serde_json::from_str(r#"{"name":"HP"}"#).expect("deserializes");
        assert!(field.visible);
        assert_eq!(field.value, "");
    }
}
