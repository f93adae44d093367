use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Capitalise the first letter and lower-case the rest ("tHRALL" -> "Thrall")
pub fn normalize_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Realms are stored as lower-case slugs
pub fn normalize_realm(realm: &str) -> String {
    realm.trim().to_lowercase()
}

/// A tracked character as persisted by the character store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub realm: String,
    pub class: String,
    pub overall_score: f64,
    pub tank_score: f64,
    pub heal_score: f64,
    pub dps_score: f64,
    /// Unix epoch seconds, set by the store
    pub date_updated: i64,
    /// Unix epoch seconds, set by the store
    pub date_created: i64,
}

impl Character {
    /// Natural key rendered as `Name-realm`
    pub fn key(&self) -> String {
        format!("{}-{}", self.name, self.realm)
    }

    pub fn matches(&self, name: &str, realm: &str) -> bool {
        self.name == name && self.realm == realm
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.realm)
    }
}

// ============================================================================
// Battle.net mythic keystone profile
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RealmRef {
    pub slug: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CharacterRef {
    pub id: u64,
    pub name: String,
    pub realm: RealmRef,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MythicRating {
    pub rating: f64,
}

/// Partial `mythic-keystone-profile` response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeystoneProfile {
    pub character: CharacterRef,
    pub current_mythic_rating: Option<MythicRating>,
}

impl KeystoneProfile {
    /// Current rating; Battle.net omits the field until a rated run exists
    /// in the active season, which reads as zero.
    pub fn rating(&self) -> f64 {
        self.current_mythic_rating
            .as_ref()
            .map(|r| r.rating)
            .unwrap_or(0.0)
    }
}

// ============================================================================
// Raider.IO character profile
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoleScores {
    pub all: f64,
    pub dps: f64,
    pub healer: f64,
    pub tank: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeasonScores {
    pub season: String,
    pub scores: RoleScores,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Rank {
    pub world: u32,
    pub region: u32,
    pub realm: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Ranks {
    pub overall: Rank,
    pub tank: Rank,
    pub healer: Rank,
    pub dps: Rank,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeystoneRun {
    pub dungeon: String,
    pub short_name: String,
    pub mythic_level: u32,
    pub completed_at: DateTime<Utc>,
    pub num_keystone_upgrades: u32,
    pub score: f64,
    pub url: String,
    pub background_image_url: String,
}

impl Default for KeystoneRun {
    fn default() -> Self {
        Self {
            dungeon: String::new(),
            short_name: String::new(),
            mythic_level: 0,
            completed_at: DateTime::<Utc>::UNIX_EPOCH,
            num_keystone_upgrades: 0,
            score: 0.0,
            url: String::new(),
            background_image_url: String::new(),
        }
    }
}

/// Partial `/api/v1/characters/profile` response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RaiderIoProfile {
    pub name: String,
    pub class: String,
    pub thumbnail_url: String,
    pub profile_url: String,
    pub mythic_plus_scores_by_season: Vec<SeasonScores>,
    pub mythic_plus_ranks: Ranks,
    pub mythic_plus_recent_runs: Vec<KeystoneRun>,
}

impl RaiderIoProfile {
    /// First season entry, or zeroed scores when the provider sent none
    pub fn current_season(&self) -> SeasonScores {
        self.mythic_plus_scores_by_season
            .first()
            .cloned()
            .unwrap_or_default()
    }

    /// Most recently completed run. Recent runs are not guaranteed to be in
    /// chronological order; ties keep the first run seen.
    pub fn latest_run(&self) -> Option<&KeystoneRun> {
        let mut runs = self.mythic_plus_recent_runs.iter();
        let mut latest = runs.next()?;
        for run in runs {
            if run.completed_at > latest.completed_at {
                latest = run;
            }
        }
        Some(latest)
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct MessageField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Structured notification content (title, body, images, colour)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct RichMessage {
    pub content: Option<String>,
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub color: u32,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub author: Option<MessageAuthor>,
    pub fields: Vec<MessageField>,
}

/// Outcome counters for one synchronisation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub checked: usize,
    pub unchanged: usize,
    pub updated: usize,
    pub failed: usize,
    pub notify_failed: usize,
}
