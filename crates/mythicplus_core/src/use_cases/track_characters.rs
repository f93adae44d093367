use std::sync::Arc;

use tracing::{info, instrument};

use crate::entities::{normalize_name, normalize_realm, Character};
use crate::error::Error;
use crate::ports::{CharacterRepository, ProfileProvider, RatingProvider};

/// Adds, removes and lists tracked characters.
///
/// Names and realms are normalised here so the store only ever sees
/// `Name` / `realm` keys.
pub struct TrackCharactersUseCase<R, A, B>
where
    R: CharacterRepository,
    A: RatingProvider,
    B: ProfileProvider,
{
    characters: Arc<R>,
    ratings: Arc<A>,
    profiles: Arc<B>,
}

impl<R, A, B> TrackCharactersUseCase<R, A, B>
where
    R: CharacterRepository,
    A: RatingProvider,
    B: ProfileProvider,
{
    pub fn new(characters: Arc<R>, ratings: Arc<A>, profiles: Arc<B>) -> Self {
        Self {
            characters,
            ratings,
            profiles,
        }
    }

    /// Start tracking a character, seeding its scores from both providers
    #[instrument(skip(self))]
    pub async fn add(&self, name: &str, realm: &str) -> Result<Character, Error> {
        let name = normalize_name(name);
        let realm = normalize_realm(realm);

        if self.characters.get_character(&name, &realm).await?.is_some() {
            return Err(Error::AlreadyTracked(format!("{}-{}", name, realm)));
        }

        let keystone = self.ratings.fetch_rating(&realm, &name).await?;
        let profile = self.profiles.fetch_profile(&realm, &name).await?;
        let season = profile.current_season();

        let character = Character {
            id: keystone.character.id,
            name,
            realm,
            class: profile.class.clone(),
            overall_score: keystone.rating(),
            tank_score: season.scores.tank,
            heal_score: season.scores.healer,
            dps_score: season.scores.dps,
            date_updated: 0,
            date_created: 0,
        };

        self.characters.insert_character(&character).await?;
        info!(character = %character, score = character.overall_score, "now tracking character");

        // Re-read so the caller sees store-assigned timestamps
        Ok(self
            .characters
            .get_character(&character.name, &character.realm)
            .await?
            .unwrap_or(character))
    }

    /// Stop tracking a character
    #[instrument(skip(self))]
    pub async fn remove(&self, name: &str, realm: &str) -> Result<(), Error> {
        let name = normalize_name(name);
        let realm = normalize_realm(realm);

        if !self.characters.delete_character(&name, &realm).await? {
            return Err(Error::NotTracked(format!("{}-{}", name, realm)));
        }

        info!(character = %name, realm = %realm, "stopped tracking character");
        Ok(())
    }

    /// Tracked characters, highest score first; `0` lists all
    pub async fn list(&self, limit: usize) -> Result<Vec<Character>, Error> {
        self.characters.list_characters(limit).await
    }
}
