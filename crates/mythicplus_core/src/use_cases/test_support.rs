//! Recording test doubles for every port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::clock::Sleeper;
use crate::entities::{
    Character, CharacterRef, KeystoneProfile, MythicRating, RaiderIoProfile, RealmRef,
    RichMessage, RoleScores, SeasonScores,
};
use crate::error::Error;
use crate::ports::{CharacterRepository, Notifier, ProfileProvider, RatingProvider};

pub fn character(name: &str, realm: &str, score: f64) -> Character {
    Character {
        id: 1,
        name: name.to_string(),
        realm: realm.to_string(),
        class: "Paladin".to_string(),
        overall_score: score,
        ..Character::default()
    }
}

pub fn raider_profile(tank: f64, healer: f64, dps: f64) -> RaiderIoProfile {
    RaiderIoProfile {
        class: "Paladin".to_string(),
        mythic_plus_scores_by_season: vec![SeasonScores {
            season: "season-tww-1".to_string(),
            scores: RoleScores {
                all: tank.max(healer).max(dps),
                dps,
                healer,
                tank,
            },
        }],
        ..RaiderIoProfile::default()
    }
}

#[derive(Default)]
pub struct MockCharacterRepository {
    pub characters: Mutex<Vec<Character>>,
    pub fail_list: bool,
    pub fail_update: bool,
    pub updates: Mutex<Vec<Character>>,
    pub list_calls: AtomicUsize,
}

impl MockCharacterRepository {
    pub fn with(characters: Vec<Character>) -> Self {
        Self {
            characters: Mutex::new(characters),
            ..Self::default()
        }
    }

    pub fn updates(&self) -> Vec<Character> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl CharacterRepository for MockCharacterRepository {
    async fn list_characters(&self, limit: usize) -> Result<Vec<Character>, Error> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(Error::Store("database error".to_string()));
        }
        let characters = self.characters.lock().unwrap().clone();
        Ok(if limit > 0 {
            characters.into_iter().take(limit).collect()
        } else {
            characters
        })
    }

    async fn get_character(&self, name: &str, realm: &str) -> Result<Option<Character>, Error> {
        Ok(self
            .characters
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.matches(name, realm))
            .cloned())
    }

    async fn insert_character(&self, character: &Character) -> Result<(), Error> {
        self.characters.lock().unwrap().push(character.clone());
        Ok(())
    }

    async fn update_character(&self, character: &Character) -> Result<(), Error> {
        if self.fail_update {
            return Err(Error::Store("disk full".to_string()));
        }
        self.updates.lock().unwrap().push(character.clone());
        Ok(())
    }

    async fn delete_character(&self, name: &str, realm: &str) -> Result<bool, Error> {
        let mut characters = self.characters.lock().unwrap();
        let before = characters.len();
        characters.retain(|c| !c.matches(name, realm));
        Ok(characters.len() != before)
    }
}

/// Ratings keyed by `name-realm`; characters without an entry fail
#[derive(Default)]
pub struct MockRatingProvider {
    pub ratings: HashMap<String, f64>,
    pub calls: Mutex<Vec<String>>,
}

impl MockRatingProvider {
    pub fn with(ratings: &[(&str, f64)]) -> Self {
        Self {
            ratings: ratings
                .iter()
                .map(|(key, rating)| (key.to_string(), *rating))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RatingProvider for MockRatingProvider {
    async fn fetch_rating(&self, realm: &str, name: &str) -> Result<KeystoneProfile, Error> {
        let key = format!("{}-{}", name, realm);
        self.calls.lock().unwrap().push(key.clone());
        let rating = self.ratings.get(&key).copied().ok_or(Error::Provider {
            provider: "blizzard",
            status: 404,
        })?;
        Ok(KeystoneProfile {
            character: CharacterRef {
                id: 99,
                name: name.to_string(),
                realm: RealmRef {
                    slug: realm.to_string(),
                    name: None,
                },
            },
            current_mythic_rating: Some(MythicRating { rating }),
        })
    }
}

#[derive(Default)]
pub struct MockProfileProvider {
    pub profile: RaiderIoProfile,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl MockProfileProvider {
    pub fn with(profile: RaiderIoProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileProvider for MockProfileProvider {
    async fn fetch_profile(&self, _realm: &str, _name: &str) -> Result<RaiderIoProfile, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Decode("expected value at line 1".to_string()));
        }
        Ok(self.profile.clone())
    }
}

#[derive(Default)]
pub struct MockNotifier {
    pub fail: bool,
    pub sent: Mutex<Vec<(String, RichMessage)>>,
}

impl MockNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, RichMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_message(&self, _channel_id: &str, _content: &str) -> Result<(), Error> {
        Ok(())
    }

    async fn send_rich_message(
        &self,
        channel_id: &str,
        message: &RichMessage,
    ) -> Result<(), Error> {
        // Record attempts even when failing so tests can count them
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), message.clone()));
        if self.fail {
            return Err(Error::Notify("discord unavailable".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingSleeper {
    pub calls: AtomicUsize,
    pub durations: Mutex<Vec<Duration>>,
    /// Cancelled on the first pause, to simulate shutdown mid-pass
    pub cancel_on_sleep: Option<CancellationToken>,
}

impl CountingSleeper {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sleeper for CountingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.durations.lock().unwrap().push(duration);
        if let Some(token) = &self.cancel_on_sleep {
            token.cancel();
        }
    }
}
