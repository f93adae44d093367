mod sync_scores;
mod track_characters;

#[cfg(test)]
mod test_support;

pub use sync_scores::{SyncScoresUseCase, DEFAULT_COOLDOWN};
pub use track_characters::TrackCharactersUseCase;
