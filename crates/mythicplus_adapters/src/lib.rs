pub mod blizzard;
pub mod characters;
pub mod configuration;
pub mod discord;
pub mod log_notifier;
pub mod memory;
pub mod network;
pub mod raiderio;
pub mod telemetry;

// Re-exports for convenience
pub use blizzard::{BlizzardClient, CredentialCache};
pub use characters::FileCharacterRepository;
pub use discord::DiscordNotifier;
pub use log_notifier::LogNotifier;
pub use memory::InMemoryCharacterRepository;
pub use raiderio::RaiderIoClient;
