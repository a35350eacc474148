use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, ParticipantId};

use super::models::{
    EMOJI_CELEBRATION, EMOJI_CHECK, EMOJI_HUNDRED, EMOJI_OMINOUS, EMOJI_SMIRK,
};

/// The single shared game state: where the count stands, who counted last,
/// and the failed-role bookkeeping. One instance per deployment, owned by
/// the engine and persisted on every transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub current_count: u32,
    pub current_contributor: Option<ParticipantId>,
    pub high_score: u32,
    pub high_score_emoji_shown: bool,
    pub failed_participant: Option<ParticipantId>,
    pub redemption_progress: u32,
}

impl GameState {
    /// The only value the next submission may carry.
    pub fn next_expected(&self) -> u32 {
        self.current_count + 1
    }

    /// Advance the count for an accepted submission and pick the reaction
    /// emoji.
    ///
    /// The emoji is selected against the high score as it stood before this
    /// submission: a run that climbs back up celebrates once when it ties
    /// the standing record, while the fixed milestones (100, 69, 666) apply
    /// whenever the record is not being tied. The celebration flag is part
    /// of this transition so the selection and its side effect cannot be
    /// torn apart by a concurrent reader.
    pub fn record_accepted(&mut self, participant: ParticipantId) -> &'static str {
        self.current_count += 1;
        self.current_contributor = Some(participant);
        let emoji = self.reaction_emoji();
        self.high_score = self.high_score.max(self.current_count);
        emoji
    }

    /// Reset after a broken count. The high score survives.
    pub fn reset(&mut self) {
        self.current_count = 0;
        self.current_contributor = None;
        self.high_score_emoji_shown = false;
        self.redemption_progress = 0;
    }

    fn reaction_emoji(&mut self) -> &'static str {
        if self.current_count == self.high_score && !self.high_score_emoji_shown {
            self.high_score_emoji_shown = true;
            EMOJI_CELEBRATION
        } else if self.current_count == 100 {
            EMOJI_HUNDRED
        } else if self.current_count == 69 {
            EMOJI_SMIRK
        } else if self.current_count == 666 {
            EMOJI_OMINOUS
        } else {
            EMOJI_CHECK
        }
    }
}

/// Persistence boundary for [`GameState`].
///
/// `save` is a total overwrite and must be atomic from the engine's point of
/// view: a crashed save leaves the previous state readable, never a partial
/// one.
#[async_trait]
pub trait GameStateStore: Send + Sync {
    async fn load(&self) -> Result<Option<GameState>, AppError>;
    async fn save(&self, state: &GameState) -> Result<(), AppError>;
}

/// JSON-file implementation of [`GameStateStore`].
///
/// Writes go to a sibling temp file first and are renamed into place, so the
/// last good state survives a write that dies midway.
pub struct JsonFileGameStateStore {
    path: PathBuf,
}

impl JsonFileGameStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl GameStateStore for JsonFileGameStateStore {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Option<GameState>, AppError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved game state");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Failed to read game state");
                return Err(AppError::Storage(e.to_string()));
            }
        };

        let state = serde_json::from_str(&contents).map_err(|e| {
            warn!(error = %e, path = %self.path.display(), "Failed to parse game state");
            AppError::Storage(e.to_string())
        })?;

        debug!(path = %self.path.display(), "Game state loaded");
        Ok(Some(state))
    }

    #[instrument(skip(self, state))]
    async fn save(&self, state: &GameState) -> Result<(), AppError> {
        let contents = serde_json::to_vec_pretty(state).map_err(|e| {
            warn!(error = %e, "Failed to serialize game state");
            AppError::Storage(e.to_string())
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &contents).await.map_err(|e| {
            warn!(error = %e, path = %tmp.display(), "Failed to write game state");
            AppError::Storage(e.to_string())
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            warn!(error = %e, path = %self.path.display(), "Failed to replace game state file");
            AppError::Storage(e.to_string())
        })?;

        debug!(count = state.current_count, "Game state saved");
        Ok(())
    }
}

/// In-memory implementation of [`GameStateStore`] for development and testing
pub struct InMemoryGameStateStore {
    state: Mutex<Option<GameState>>,
}

impl Default for InMemoryGameStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameStateStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Creates a store pre-populated with a saved state
    pub fn with_state(state: GameState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    /// The last saved state, for asserting on persistence in tests
    pub fn saved(&self) -> Option<GameState> {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl GameStateStore for InMemoryGameStateStore {
    async fn load(&self) -> Result<Option<GameState>, AppError> {
        Ok(self.state.lock().unwrap().clone())
    }

    async fn save(&self, state: &GameState) -> Result<(), AppError> {
        *self.state.lock().unwrap() = Some(state.clone());
        Ok(())
    }
}
