use async_trait::async_trait;

use crate::entities::{Character, KeystoneProfile, RaiderIoProfile, RichMessage};
use crate::error::Error;

// ============================================================================
// Persistence Ports
// ============================================================================

/// Tracked character persistence, keyed by name + realm
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// List characters ordered by descending overall score; `0` means no limit
    async fn list_characters(&self, limit: usize) -> Result<Vec<Character>, Error>;

    /// Look up a single character by its natural key
    async fn get_character(&self, name: &str, realm: &str) -> Result<Option<Character>, Error>;

    /// Add a new character
    async fn insert_character(&self, character: &Character) -> Result<(), Error>;

    /// Overwrite the score fields of an existing character
    async fn update_character(&self, character: &Character) -> Result<(), Error>;

    /// Remove a character, returning whether it existed
    async fn delete_character(&self, name: &str, realm: &str) -> Result<bool, Error>;
}

// ============================================================================
// Score Provider Ports
// ============================================================================

/// Authoritative overall rating source (Battle.net)
#[async_trait]
pub trait RatingProvider: Send + Sync {
    async fn fetch_rating(&self, realm: &str, name: &str) -> Result<KeystoneProfile, Error>;
}

/// Supplementary role scores, ranks and recent runs (Raider.IO)
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    async fn fetch_profile(&self, realm: &str, name: &str) -> Result<RaiderIoProfile, Error>;
}

// ============================================================================
// Notification Ports
// ============================================================================

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a plain text message
    async fn send_message(&self, channel_id: &str, content: &str) -> Result<(), Error>;

    /// Send a message with structured content
    async fn send_rich_message(&self, channel_id: &str, message: &RichMessage)
        -> Result<(), Error>;
}
