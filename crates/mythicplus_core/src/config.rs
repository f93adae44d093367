use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Battle.net API region; Raider.IO uses the same codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Us,
    Eu,
    Kr,
    Tw,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Eu => "eu",
            Region::Kr => "kr",
            Region::Tw => "tw",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub blizzard: BlizzardSettings,
    pub raiderio: RaiderIoSettings,
    pub discord: DiscordSettings,
    #[serde(default)]
    pub store: StoreSettings,
    pub updater: UpdaterSettings,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct BlizzardSettings {
    pub client_id: String,
    pub client_secret: String,
    pub region: Region,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RaiderIoSettings {
    pub access_key: String,
    pub region: Region,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DiscordSettings {
    pub token: String,
    pub channel_id: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StoreSettings {
    /// JSON file holding tracked characters; the data dir is used when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UpdaterSettings {
    /// Minutes between scheduled passes
    pub frequency_minutes: u64,
    /// Pause after each character whose update was attempted
    pub cooldown_ms: u64,
}

pub const DEFAULT_FREQUENCY_MINUTES: u64 = 30;
/// One week
pub const MAX_FREQUENCY_MINUTES: u64 = 7 * 24 * 60;

impl UpdaterSettings {
    /// Interval between scheduled passes. Zero means unset and falls back
    /// to the default; anything above a week is capped.
    pub fn frequency(&self) -> Duration {
        let minutes = match self.frequency_minutes {
            0 => DEFAULT_FREQUENCY_MINUTES,
            m => m.min(MAX_FREQUENCY_MINUTES),
        };
        Duration::from_secs(minutes.saturating_mul(60))
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blizzard: BlizzardSettings::default(),
            raiderio: RaiderIoSettings::default(),
            discord: DiscordSettings::default(),
            store: StoreSettings::default(),
            updater: UpdaterSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for UpdaterSettings {
    fn default() -> Self {
        Self {
            frequency_minutes: DEFAULT_FREQUENCY_MINUTES,
            cooldown_ms: 250,
        }
    }
}
