//! SheetForge domain core
//!
//! The in-memory engine of an RPG sheet manager: system templates,
//! character field lists, the expression resolver that keeps derived
//! fields current, the dice roll engine, and category grouping for
//! display. Persistence, identity, and rendering live behind the port
//! traits in `sheetforge-ports`; everything here is a synchronous, pure
//! transformation over one character's field list.

pub mod categories;
pub mod entities;
pub mod error;
pub mod expressions;
pub mod ids;
pub mod value_objects;

pub use categories::{category_names, organize_by_category, CategoryGroup};
pub use entities::{
    Character, ComponentType, Field, FieldRole, RollConfig, RpgSystem, DEFAULT_CATEGORY,
};
pub use error::DomainError;
pub use expressions::{calculate_expressions, dependency_graph, evaluate, EvalError};
pub use ids::{CampaignId, CharacterId, SystemId, UserId};
pub use value_objects::{
    common_formulas, roll_formula, validate_formula, DiceFormulaError, DiceRollRecord,
    DiceRollResult, DieRoller, SequenceRoller, ThreadRngRoller,
};
