//! Character store port - Interface for character persistence
//!
//! The core operates on the in-memory field list handed to it and returns
//! an updated copy; this port is where those copies come from and go to.
//! Concurrent edits to the same character must be serialized by the
//! implementation behind this trait.

use anyhow::Result;
use async_trait::async_trait;

use sheetforge_domain::{Character, CharacterId, UserId};

/// Port for character persistence
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Get a character by ID
    async fn get_character(&self, character_id: CharacterId) -> Result<Option<Character>>;

    /// List all characters belonging to a user
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Character>>;

    /// Create or update a character
    async fn save_character(&self, character: &Character) -> Result<()>;

    /// Delete a character and its field instances
    async fn delete_character(&self, character_id: CharacterId) -> Result<()>;
}
