use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::Utc;
use mythicplus_core::entities::Character;
use mythicplus_core::ports::CharacterRepository;
use mythicplus_core::Error;
use tokio::sync::RwLock;

/// Sort by overall score, highest first
pub(crate) fn sort_by_score(characters: &mut [Character]) {
    characters.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(Ordering::Equal)
    });
}

pub(crate) fn take_limit(mut characters: Vec<Character>, limit: usize) -> Vec<Character> {
    sort_by_score(&mut characters);
    if limit > 0 {
        characters.truncate(limit);
    }
    characters
}

/// Character store kept in process memory; contents are lost on exit
#[derive(Debug, Default)]
pub struct InMemoryCharacterRepository {
    characters: RwLock<Vec<Character>>,
}

impl InMemoryCharacterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CharacterRepository for InMemoryCharacterRepository {
    async fn list_characters(&self, limit: usize) -> Result<Vec<Character>, Error> {
        let characters = self.characters.read().await.clone();
        Ok(take_limit(characters, limit))
    }

    async fn get_character(&self, name: &str, realm: &str) -> Result<Option<Character>, Error> {
        Ok(self
            .characters
            .read()
            .await
            .iter()
            .find(|c| c.matches(name, realm))
            .cloned())
    }

    async fn insert_character(&self, character: &Character) -> Result<(), Error> {
        let mut characters = self.characters.write().await;
        if characters
            .iter()
            .any(|c| c.matches(&character.name, &character.realm))
        {
            return Err(Error::AlreadyTracked(character.key()));
        }

        let now = Utc::now().timestamp();
        let mut character = character.clone();
        character.date_created = now;
        character.date_updated = now;
        characters.push(character);
        Ok(())
    }

    async fn update_character(&self, character: &Character) -> Result<(), Error> {
        let mut characters = self.characters.write().await;
        let existing = characters
            .iter_mut()
            .find(|c| c.matches(&character.name, &character.realm))
            .ok_or_else(|| Error::Store(format!("character {} not found", character.key())))?;

        existing.overall_score = character.overall_score;
        existing.tank_score = character.tank_score;
        existing.heal_score = character.heal_score;
        existing.dps_score = character.dps_score;
        existing.date_updated = Utc::now().timestamp();
        Ok(())
    }

    async fn delete_character(&self, name: &str, realm: &str) -> Result<bool, Error> {
        let mut characters = self.characters.write().await;
        let before = characters.len();
        characters.retain(|c| !c.matches(name, realm));
        Ok(characters.len() != before)
    }
}
