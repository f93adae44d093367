use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use mythicplus_core::entities::Character;
use mythicplus_core::ports::CharacterRepository;
use mythicplus_core::Error;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, instrument};

use crate::memory::take_limit;

const STORE_FILE: &str = "characters.json";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CharacterStore {
    characters: Vec<Character>,
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// File-based character repository.
///
/// Every operation holds an advisory lock on `characters.json.lock` so
/// several processes can share one store; writes go through a temp file
/// and a rename so readers never see a partial file.
pub struct FileCharacterRepository {
    store_path: PathBuf,
    lock_path: PathBuf,
}

impl FileCharacterRepository {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            store_path: data_dir.join(STORE_FILE),
            lock_path: data_dir.join(format!("{}.lock", STORE_FILE)),
        }
    }

    /// Released when the returned file is dropped
    async fn lock(&self, mode: LockMode) -> Result<File, Error> {
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || -> Result<File, Error> {
            if let Some(parent) = lock_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)?;
            match mode {
                LockMode::Shared => file.lock_shared()?,
                LockMode::Exclusive => file.lock_exclusive()?,
            }
            Ok(file)
        })
        .await
        .map_err(|e| Error::Store(format!("failed to lock character store: {}", e)))?
    }

    async fn load(&self) -> Result<CharacterStore, Error> {
        if !fs::try_exists(&self.store_path).await.unwrap_or(false) {
            return Ok(CharacterStore::default());
        }

        let content = fs::read_to_string(&self.store_path).await?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Store(format!("failed to parse characters file: {}", e)))
    }

    async fn save(&self, store: &CharacterStore) -> Result<(), Error> {
        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(store)
            .map_err(|e| Error::Store(format!("failed to serialize characters: {}", e)))?;

        let tmp_path = self
            .store_path
            .with_file_name(format!(".{}.tmp-{}", STORE_FILE, std::process::id()));
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &self.store_path).await?;
        Ok(())
    }
}

#[async_trait]
impl CharacterRepository for FileCharacterRepository {
    #[instrument(skip(self))]
    async fn list_characters(&self, limit: usize) -> Result<Vec<Character>, Error> {
        let _lock = self.lock(LockMode::Shared).await?;
        let store = self.load().await?;
        Ok(take_limit(store.characters, limit))
    }

    #[instrument(skip(self))]
    async fn get_character(&self, name: &str, realm: &str) -> Result<Option<Character>, Error> {
        let _lock = self.lock(LockMode::Shared).await?;
        let store = self.load().await?;
        Ok(store
            .characters
            .into_iter()
            .find(|c| c.matches(name, realm)))
    }

    #[instrument(skip(self, character), fields(character = %character))]
    async fn insert_character(&self, character: &Character) -> Result<(), Error> {
        let _lock = self.lock(LockMode::Exclusive).await?;
        let mut store = self.load().await?;

        if store
            .characters
            .iter()
            .any(|c| c.matches(&character.name, &character.realm))
        {
            return Err(Error::AlreadyTracked(character.key()));
        }

        debug!("inserting character");
        let now = Utc::now().timestamp();
        let mut character = character.clone();
        character.date_created = now;
        character.date_updated = now;
        store.characters.push(character);

        self.save(&store).await
    }

    #[instrument(skip(self, character), fields(character = %character))]
    async fn update_character(&self, character: &Character) -> Result<(), Error> {
        let _lock = self.lock(LockMode::Exclusive).await?;
        let mut store = self.load().await?;

        let existing = store
            .characters
            .iter_mut()
            .find(|c| c.matches(&character.name, &character.realm))
            .ok_or_else(|| Error::Store(format!("character {} not found", character.key())))?;

        existing.overall_score = character.overall_score;
        existing.tank_score = character.tank_score;
        existing.heal_score = character.heal_score;
        existing.dps_score = character.dps_score;
        existing.date_updated = Utc::now().timestamp();

        self.save(&store).await
    }

    #[instrument(skip(self))]
    async fn delete_character(&self, name: &str, realm: &str) -> Result<bool, Error> {
        let _lock = self.lock(LockMode::Exclusive).await?;
        let mut store = self.load().await?;
        let before = store.characters.len();
        store.characters.retain(|c| !c.matches(name, realm));

        if store.characters.len() == before {
            return Ok(false);
        }
        self.save(&store).await?;
        Ok(true)
    }
}
