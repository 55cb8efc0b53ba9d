//! Domain entities

mod character;
mod field;
mod system;

pub use character::Character;
pub use field::{ComponentType, Field, FieldRole, RollConfig, DEFAULT_CATEGORY};
pub use system::RpgSystem;
