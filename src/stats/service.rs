use std::sync::Arc;

use crate::game::CountingEngine;
use crate::ledger::LedgerRepository;
use crate::shared::{AppError, ParticipantId};

use super::models::{LeaderboardEntry, ParticipantStats, ServerStats};

/// Read-side queries over the ledger and the live game state.
pub struct StatsService {
    engine: Arc<CountingEngine>,
    ledger: Arc<dyn LedgerRepository>,
}

impl StatsService {
    pub const LEADERBOARD_SIZE: u32 = 10;

    pub fn new(engine: Arc<CountingEngine>, ledger: Arc<dyn LedgerRepository>) -> Self {
        Self { engine, ledger }
    }

    /// Stats for one participant, or `None` if they have never counted.
    pub async fn participant_stats(
        &self,
        participant: ParticipantId,
    ) -> Result<Option<ParticipantStats>, AppError> {
        let Some(record) = self.ledger.get(participant).await? else {
            return Ok(None);
        };

        let rank = self.ledger.rank_for_score(record.score).await?;
        let attempts = record.correct + record.wrong;
        let accuracy = if attempts == 0 {
            0.0
        } else {
            f64::from(record.correct) / f64::from(attempts) * 100.0
        };

        Ok(Some(ParticipantStats {
            participant_id: record.participant_id,
            score: record.score,
            correct: record.correct,
            wrong: record.wrong,
            best_count: record.best_count,
            rank,
            accuracy,
        }))
    }

    pub async fn server_stats(&self) -> ServerStats {
        let state = self.engine.snapshot().await;
        ServerStats {
            current_count: state.current_count,
            high_score: state.high_score,
            last_contributor: state.current_contributor,
        }
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let top = self.ledger.top_by_score(Self::LEADERBOARD_SIZE).await?;
        Ok(top
            .into_iter()
            .enumerate()
            .map(|(i, record)| LeaderboardEntry {
                rank: i as u32 + 1,
                participant_id: record.participant_id,
                score: record.score,
            })
            .collect())
    }
}
