use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::clock::Sleeper;
use crate::entities::{Character, PassSummary};
use crate::error::Error;
use crate::notification::build_score_update_message;
use crate::ports::{CharacterRepository, Notifier, ProfileProvider, RatingProvider};

/// Pause between characters whose update was attempted
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharacterOutcome {
    Unchanged,
    Updated { notified: bool },
}

/// Orchestrates one reconciliation pass over every tracked character:
/// - Battle.net rating lookup and exact-equality change detection
/// - Raider.IO role scores for changed characters
/// - Persistence of the merged scores
/// - Score change announcement
///
/// Characters are processed strictly one at a time. The cooldown after each
/// attempted update is what bounds the request rate to both providers.
pub struct SyncScoresUseCase<R, A, B, N, S>
where
    R: CharacterRepository,
    A: RatingProvider,
    B: ProfileProvider,
    N: Notifier,
    S: Sleeper,
{
    characters: Arc<R>,
    ratings: Arc<A>,
    profiles: Arc<B>,
    notifier: Arc<N>,
    sleeper: Arc<S>,
    cooldown: Duration,
}

impl<R, A, B, N, S> SyncScoresUseCase<R, A, B, N, S>
where
    R: CharacterRepository,
    A: RatingProvider,
    B: ProfileProvider,
    N: Notifier,
    S: Sleeper,
{
    pub fn new(
        characters: Arc<R>,
        ratings: Arc<A>,
        profiles: Arc<B>,
        notifier: Arc<N>,
        sleeper: Arc<S>,
    ) -> Self {
        Self {
            characters,
            ratings,
            profiles,
            notifier,
            sleeper,
            cooldown: DEFAULT_COOLDOWN,
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Run a full pass, announcing changes to `channel_id`.
    ///
    /// Only a failure to list characters fails the pass. Every per-character
    /// failure is logged and the pass moves on. Cancellation is honoured
    /// between characters, never in the middle of one.
    #[instrument(skip(self, cancel))]
    pub async fn run_pass(
        &self,
        channel_id: &str,
        cancel: &CancellationToken,
    ) -> Result<PassSummary, Error> {
        info!("running score update pass");

        let characters = self.characters.list_characters(0).await.map_err(|e| {
            error!(error = %e, "failed to list characters");
            Error::ListCharacters(Box::new(e))
        })?;

        let mut summary = PassSummary::default();

        for character in characters {
            if cancel.is_cancelled() {
                info!(checked = summary.checked, "score update pass cancelled");
                return Err(Error::Cancelled);
            }

            summary.checked += 1;
            let name = character.name.clone();
            let realm = character.realm.clone();

            match self.update_character(channel_id, character).await {
                Ok(CharacterOutcome::Unchanged) => {
                    summary.unchanged += 1;
                    continue;
                }
                Ok(CharacterOutcome::Updated { notified }) => {
                    summary.updated += 1;
                    if !notified {
                        summary.notify_failed += 1;
                    }
                }
                Err(e) => {
                    warn!(character = %name, realm = %realm, error = %e, "failed to update character");
                    summary.failed += 1;
                    continue;
                }
            }

            // Keep Battle.net, Raider.IO and Discord from seeing bursts
            tokio::select! {
                _ = self.sleeper.sleep(self.cooldown) => {}
                _ = cancel.cancelled() => {}
            }
        }

        info!(
            checked = summary.checked,
            updated = summary.updated,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "score update pass complete"
        );
        Ok(summary)
    }

    async fn update_character(
        &self,
        channel_id: &str,
        mut character: Character,
    ) -> Result<CharacterOutcome, Error> {
        let keystone = self
            .ratings
            .fetch_rating(&character.realm, &character.name)
            .await?;
        let rating = keystone.rating();

        // Exact comparison: a season reset to any new value must register
        if rating == character.overall_score {
            debug!(character = %character, score = rating, "score unchanged");
            return Ok(CharacterOutcome::Unchanged);
        }

        let profile = self
            .profiles
            .fetch_profile(&character.realm, &character.name)
            .await?;
        let season = profile.current_season();

        let old_score = character.overall_score;
        character.overall_score = rating;
        character.tank_score = season.scores.tank;
        character.heal_score = season.scores.healer;
        character.dps_score = season.scores.dps;

        self.characters.update_character(&character).await?;
        info!(character = %character, old_score, new_score = rating, "score updated");

        let message = build_score_update_message(&character, &profile, old_score);
        let notified = match self.notifier.send_rich_message(channel_id, &message).await {
            Ok(()) => true,
            Err(e) => {
                warn!(character = %character, error = %e, "failed to announce score update");
                false
            }
        };

        Ok(CharacterOutcome::Updated { notified })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::RaiderIoProfile;
    use crate::use_cases::test_support::*;

    type TestUseCase = SyncScoresUseCase<
        MockCharacterRepository,
        MockRatingProvider,
        MockProfileProvider,
        MockNotifier,
        CountingSleeper,
    >;

    struct Harness {
        store: Arc<MockCharacterRepository>,
        ratings: Arc<MockRatingProvider>,
        profiles: Arc<MockProfileProvider>,
        notifier: Arc<MockNotifier>,
        sleeper: Arc<CountingSleeper>,
    }

    impl Harness {
        fn new(
            store: MockCharacterRepository,
            ratings: MockRatingProvider,
            profiles: MockProfileProvider,
            notifier: MockNotifier,
        ) -> Self {
            Self::with_sleeper(store, ratings, profiles, notifier, CountingSleeper::default())
        }

        fn with_sleeper(
            store: MockCharacterRepository,
            ratings: MockRatingProvider,
            profiles: MockProfileProvider,
            notifier: MockNotifier,
            sleeper: CountingSleeper,
        ) -> Self {
            Self {
                store: Arc::new(store),
                ratings: Arc::new(ratings),
                profiles: Arc::new(profiles),
                notifier: Arc::new(notifier),
                sleeper: Arc::new(sleeper),
            }
        }

        fn use_case(&self) -> TestUseCase {
            SyncScoresUseCase::new(
                self.store.clone(),
                self.ratings.clone(),
                self.profiles.clone(),
                self.notifier.clone(),
                self.sleeper.clone(),
            )
        }

        async fn run(&self) -> Result<PassSummary, Error> {
            self.use_case()
                .run_pass("channel-1", &CancellationToken::new())
                .await
        }
    }

    #[tokio::test]
    async fn test_unchanged_characters_do_nothing() {
        let harness = Harness::new(
            MockCharacterRepository::with(vec![
                character("Thrall", "area-52", 2500.0),
                character("Jaina", "proudmoore", 1800.5),
            ]),
            MockRatingProvider::with(&[("Thrall-area-52", 2500.0), ("Jaina-proudmoore", 1800.5)]),
            MockProfileProvider::with(raider_profile(0.0, 0.0, 2500.0)),
            MockNotifier::default(),
        );

        let summary = harness.run().await.unwrap();

        assert_eq!(summary.checked, 2);
        assert_eq!(summary.unchanged, 2);
        assert_eq!(harness.profiles.calls(), 0);
        assert!(harness.store.updates().is_empty());
        assert!(harness.notifier.sent().is_empty());
        assert_eq!(harness.sleeper.calls(), 0);
    }

    #[tokio::test]
    async fn test_changed_character_is_merged_persisted_and_announced() {
        let harness = Harness::new(
            MockCharacterRepository::with(vec![character("Thrall", "area-52", 2500.0)]),
            MockRatingProvider::with(&[("Thrall-area-52", 2612.75)]),
            MockProfileProvider::with(raider_profile(2600.0, 0.0, 2550.25)),
            MockNotifier::default(),
        );

        let summary = harness.run().await.unwrap();

        assert_eq!(summary.updated, 1);
        let updates = harness.store.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].name, "Thrall");
        assert_eq!(updates[0].realm, "area-52");
        assert_eq!(updates[0].overall_score, 2612.75);
        assert_eq!(updates[0].tank_score, 2600.0);
        assert_eq!(updates[0].heal_score, 0.0);
        assert_eq!(updates[0].dps_score, 2550.25);

        let sent = harness.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "channel-1");
        assert_eq!(sent[0].1.title, "2612.75 Overall Mythic+ Score");

        assert_eq!(harness.sleeper.calls(), 1);
        assert_eq!(
            harness.sleeper.durations.lock().unwrap().as_slice(),
            &[DEFAULT_COOLDOWN]
        );
    }

    #[tokio::test]
    async fn test_season_rollover_to_zero_is_a_change() {
        let harness = Harness::new(
            MockCharacterRepository::with(vec![character("Thrall", "area-52", 1234.5)]),
            MockRatingProvider::with(&[("Thrall-area-52", 0.0)]),
            MockProfileProvider::with(RaiderIoProfile::default()),
            MockNotifier::default(),
        );

        let summary = harness.run().await.unwrap();

        assert_eq!(summary.updated, 1);
        let updates = harness.store.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].overall_score, 0.0);
        // No current season at Raider.IO yet: role scores reset to zero
        assert_eq!(updates[0].tank_score, 0.0);
        assert_eq!(updates[0].heal_score, 0.0);
        assert_eq!(updates[0].dps_score, 0.0);
        assert_eq!(harness.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_notify_failure_keeps_update_and_pause() {
        let harness = Harness::new(
            MockCharacterRepository::with(vec![character("Thrall", "area-52", 2500.0)]),
            MockRatingProvider::with(&[("Thrall-area-52", 2510.0)]),
            MockProfileProvider::with(raider_profile(0.0, 2510.0, 0.0)),
            MockNotifier::failing(),
        );

        let summary = harness.run().await.unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.notify_failed, 1);
        assert_eq!(harness.store.updates().len(), 1);
        assert_eq!(harness.notifier.sent().len(), 1);
        assert_eq!(harness.sleeper.calls(), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_pass() {
        let harness = Harness::new(
            MockCharacterRepository {
                fail_list: true,
                ..MockCharacterRepository::default()
            },
            MockRatingProvider::default(),
            MockProfileProvider::default(),
            MockNotifier::default(),
        );

        let err = harness.run().await.unwrap_err();

        assert!(matches!(err, Error::ListCharacters(_)));
        assert!(err.to_string().contains("failed to list characters"));
        assert!(err.to_string().contains("database error"));
        assert!(harness.ratings.calls().is_empty());
        assert_eq!(harness.profiles.calls(), 0);
        assert!(harness.notifier.sent().is_empty());
        assert_eq!(harness.sleeper.calls(), 0);
    }

    #[tokio::test]
    async fn test_only_changed_character_of_two_is_updated() {
        let harness = Harness::new(
            MockCharacterRepository::with(vec![
                character("Thrall", "area-52", 2500.0),
                character("Jaina", "proudmoore", 1800.0),
            ]),
            MockRatingProvider::with(&[("Thrall-area-52", 2500.0), ("Jaina-proudmoore", 1850.0)]),
            MockProfileProvider::with(raider_profile(0.0, 0.0, 1850.0)),
            MockNotifier::default(),
        );

        let summary = harness.run().await.unwrap();

        assert_eq!(
            summary,
            PassSummary {
                checked: 2,
                unchanged: 1,
                updated: 1,
                failed: 0,
                notify_failed: 0,
            }
        );
        assert_eq!(harness.profiles.calls(), 1);
        let updates = harness.store.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].name, "Jaina");
        assert_eq!(harness.notifier.sent().len(), 1);
        assert_eq!(harness.sleeper.calls(), 1);
    }

    #[tokio::test]
    async fn test_rating_failure_skips_without_pause() {
        // Thrall has no rating configured, so the lookup fails
        let harness = Harness::new(
            MockCharacterRepository::with(vec![
                character("Thrall", "area-52", 2500.0),
                character("Jaina", "proudmoore", 1800.0),
            ]),
            MockRatingProvider::with(&[("Jaina-proudmoore", 1900.0)]),
            MockProfileProvider::with(raider_profile(0.0, 0.0, 1900.0)),
            MockNotifier::default(),
        );

        let summary = harness.run().await.unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(
            harness.ratings.calls(),
            vec!["Thrall-area-52".to_string(), "Jaina-proudmoore".to_string()]
        );
        assert_eq!(harness.store.updates().len(), 1);
        assert_eq!(harness.sleeper.calls(), 1);
    }

    #[tokio::test]
    async fn test_profile_failure_skips_without_persisting() {
        let harness = Harness::new(
            MockCharacterRepository::with(vec![character("Thrall", "area-52", 2500.0)]),
            MockRatingProvider::with(&[("Thrall-area-52", 2600.0)]),
            MockProfileProvider {
                fail: true,
                ..MockProfileProvider::default()
            },
            MockNotifier::default(),
        );

        let summary = harness.run().await.unwrap();

        assert_eq!(summary.failed, 1);
        assert!(harness.store.updates().is_empty());
        assert!(harness.notifier.sent().is_empty());
        assert_eq!(harness.sleeper.calls(), 0);
    }

    #[tokio::test]
    async fn test_persist_failure_skips_notification_and_pause() {
        let harness = Harness::new(
            MockCharacterRepository {
                fail_update: true,
                ..MockCharacterRepository::with(vec![character("Thrall", "area-52", 2500.0)])
            },
            MockRatingProvider::with(&[("Thrall-area-52", 2600.0)]),
            MockProfileProvider::with(raider_profile(0.0, 0.0, 2600.0)),
            MockNotifier::default(),
        );

        let summary = harness.run().await.unwrap();

        assert_eq!(summary.failed, 1);
        assert!(harness.notifier.sent().is_empty());
        assert_eq!(harness.sleeper.calls(), 0);
    }

    #[tokio::test]
    async fn test_characters_processed_in_listing_order() {
        let harness = Harness::new(
            MockCharacterRepository::with(vec![
                character("Jaina", "proudmoore", 100.0),
                character("Thrall", "area-52", 2500.0),
                character("Anduin", "stormrage", 900.0),
            ]),
            MockRatingProvider::with(&[
                ("Jaina-proudmoore", 100.0),
                ("Thrall-area-52", 2500.0),
                ("Anduin-stormrage", 900.0),
            ]),
            MockProfileProvider::default(),
            MockNotifier::default(),
        );

        harness.run().await.unwrap();

        assert_eq!(
            harness.ratings.calls(),
            vec![
                "Jaina-proudmoore".to_string(),
                "Thrall-area-52".to_string(),
                "Anduin-stormrage".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let harness = Harness::new(
            MockCharacterRepository::with(vec![character("Thrall", "area-52", 2500.0)]),
            MockRatingProvider::with(&[("Thrall-area-52", 2600.0)]),
            MockProfileProvider::default(),
            MockNotifier::default(),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = harness.use_case().run_pass("channel-1", &cancel).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(harness.ratings.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_finishes_current_character_only() {
        let cancel = CancellationToken::new();
        let harness = Harness::with_sleeper(
            MockCharacterRepository::with(vec![
                character("Thrall", "area-52", 2500.0),
                character("Jaina", "proudmoore", 1800.0),
            ]),
            MockRatingProvider::with(&[("Thrall-area-52", 2600.0), ("Jaina-proudmoore", 1900.0)]),
            MockProfileProvider::with(raider_profile(0.0, 0.0, 2600.0)),
            MockNotifier::default(),
            CountingSleeper {
                cancel_on_sleep: Some(cancel.clone()),
                ..CountingSleeper::default()
            },
        );

        let result = harness.use_case().run_pass("channel-1", &cancel).await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(harness.ratings.calls(), vec!["Thrall-area-52".to_string()]);
        assert_eq!(harness.store.updates().len(), 1);
        assert_eq!(harness.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_custom_cooldown() {
        let harness = Harness::new(
            MockCharacterRepository::with(vec![character("Thrall", "area-52", 2500.0)]),
            MockRatingProvider::with(&[("Thrall-area-52", 2600.0)]),
            MockProfileProvider::with(raider_profile(0.0, 0.0, 2600.0)),
            MockNotifier::default(),
        );

        harness
            .use_case()
            .with_cooldown(Duration::from_secs(1))
            .run_pass("channel-1", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            harness.sleeper.durations.lock().unwrap().as_slice(),
            &[Duration::from_secs(1)]
        );
    }

    #[tokio::test]
    async fn test_empty_store_is_a_successful_pass() {
        let harness = Harness::new(
            MockCharacterRepository::default(),
            MockRatingProvider::default(),
            MockProfileProvider::default(),
            MockNotifier::default(),
        );

        let summary = harness.run().await.unwrap();

        assert_eq!(summary, PassSummary::default());
        assert_eq!(harness.store.list_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
