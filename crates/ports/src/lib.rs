//! SheetForge ports - collaborator seams around the domain core
//!
//! Persistence and CRUD are not part of the core; these traits document
//! the contract the surrounding application implements. Mock
//! implementations are available under the `testing` feature (or in unit
//! tests) via mockall.

mod character_store;
mod template_provider;

pub use character_store::CharacterStore;
pub use template_provider::TemplateProvider;

#[cfg(any(test, feature = "testing"))]
pub use character_store::MockCharacterStore;
#[cfg(any(test, feature = "testing"))]
pub use template_provider::MockTemplateProvider;
