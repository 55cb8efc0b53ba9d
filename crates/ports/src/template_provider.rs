//! Template provider port - Interface for system template lookup
//!
//! Supplies the ordered field-definition lists (and category order) that
//! seed characters and drive the category organizer. The domain core only
//! consumes what this port hands it; it never reaches into storage.

use anyhow::Result;
use async_trait::async_trait;

use sheetforge_domain::{RpgSystem, SystemId, UserId};

/// Port for reading and writing system templates
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TemplateProvider: Send + Sync {
    /// Get a system by ID
    async fn get_system(&self, system_id: SystemId) -> Result<Option<RpgSystem>>;

    /// List systems owned by a user, excluding obsolete ones
    async fn list_systems(&self, owner_id: UserId) -> Result<Vec<RpgSystem>>;

    /// Create or update a system template
    async fn save_system(&self, system: &RpgSystem) -> Result<()>;

    /// Mark a system obsolete (hidden from pickers, characters kept)
    async fn retire_system(&self, system_id: SystemId) -> Result<()>;
}
