use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, ParticipantId};

use super::models::ParticipantRecord;

/// Trait for participant-ledger operations
///
/// Besides the keyed mutations the engine needs, the store answers the two
/// ranked queries behind the leaderboard: how many participants sit at or
/// above a score, and the top N by score (ties broken by participant id so
/// the ordering is deterministic).
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn get(&self, participant: ParticipantId) -> Result<Option<ParticipantRecord>, AppError>;

    /// Insert-if-absent with zeroed fields; returns the current record.
    async fn ensure(&self, participant: ParticipantId) -> Result<ParticipantRecord, AppError>;

    /// Apply an accepted submission: score +1, correct +1, best count raised
    /// to `count_reached` when it is higher.
    async fn record_correct(
        &self,
        participant: ParticipantId,
        count_reached: u32,
    ) -> Result<(), AppError>;

    /// Apply a rejected submission: score -1, wrong +1.
    async fn record_wrong(&self, participant: ParticipantId) -> Result<(), AppError>;

    /// Number of participants with a score at or above `score`.
    async fn rank_for_score(&self, score: i32) -> Result<u32, AppError>;

    /// Top `limit` participants by score descending.
    async fn top_by_score(&self, limit: u32) -> Result<Vec<ParticipantRecord>, AppError>;
}

/// In-memory implementation of LedgerRepository for development and testing
pub struct InMemoryLedgerRepository {
    records: Mutex<HashMap<ParticipantId, ParticipantRecord>>,
}

impl Default for InMemoryLedgerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedgerRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a record directly, for tests that need existing history
    pub async fn insert_record(&self, record: ParticipantRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.participant_id, record);
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn get(&self, participant: ParticipantId) -> Result<Option<ParticipantRecord>, AppError> {
        Ok(self.records.lock().unwrap().get(&participant).cloned())
    }

    async fn ensure(&self, participant: ParticipantId) -> Result<ParticipantRecord, AppError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(participant)
            .or_insert_with(|| ParticipantRecord::new(participant));
        Ok(record.clone())
    }

    async fn record_correct(
        &self,
        participant: ParticipantId,
        count_reached: u32,
    ) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(participant)
            .or_insert_with(|| ParticipantRecord::new(participant));
        record.score += 1;
        record.correct += 1;
        record.best_count = record.best_count.max(count_reached);
        Ok(())
    }

    async fn record_wrong(&self, participant: ParticipantId) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(participant)
            .or_insert_with(|| ParticipantRecord::new(participant));
        record.score -= 1;
        record.wrong += 1;
        Ok(())
    }

    async fn rank_for_score(&self, score: i32) -> Result<u32, AppError> {
        let records = self.records.lock().unwrap();
        Ok(records.values().filter(|r| r.score >= score).count() as u32)
    }

    async fn top_by_score(&self, limit: u32) -> Result<Vec<ParticipantRecord>, AppError> {
        let records = self.records.lock().unwrap();
        let mut all: Vec<ParticipantRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.participant_id.cmp(&b.participant_id))
        });
        all.truncate(limit as usize);
        Ok(all)
    }
}

/// PostgreSQL implementation of the participant ledger
pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the participants table when it does not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS participants (
                participant_id BIGINT PRIMARY KEY,
                score INTEGER NOT NULL DEFAULT 0,
                correct INTEGER NOT NULL DEFAULT 0,
                wrong INTEGER NOT NULL DEFAULT 0,
                best_count INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to prepare participants table");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!("Participants table ready");
        Ok(())
    }

    fn record_from_row(row: &sqlx::postgres::PgRow) -> ParticipantRecord {
        ParticipantRecord {
            participant_id: row.get::<i64, _>("participant_id") as ParticipantId,
            score: row.get("score"),
            correct: row.get::<i32, _>("correct") as u32,
            wrong: row.get::<i32, _>("wrong") as u32,
            best_count: row.get::<i32, _>("best_count") as u32,
        }
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    #[instrument(skip(self))]
    async fn get(&self, participant: ParticipantId) -> Result<Option<ParticipantRecord>, AppError> {
        let row = sqlx::query(
            "SELECT participant_id, score, correct, wrong, best_count
             FROM participants WHERE participant_id = $1",
        )
        .bind(participant as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, participant, "Failed to fetch participant record");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(Self::record_from_row))
    }

    #[instrument(skip(self))]
    async fn ensure(&self, participant: ParticipantId) -> Result<ParticipantRecord, AppError> {
        sqlx::query(
            "INSERT INTO participants (participant_id) VALUES ($1)
             ON CONFLICT (participant_id) DO NOTHING",
        )
        .bind(participant as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, participant, "Failed to create participant record");
            AppError::DatabaseError(e.to_string())
        })?;

        self.get(participant).await?.ok_or(AppError::Internal)
    }

    #[instrument(skip(self))]
    async fn record_correct(
        &self,
        participant: ParticipantId,
        count_reached: u32,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE participants
             SET score = score + 1,
                 correct = correct + 1,
                 best_count = GREATEST(best_count, $2)
             WHERE participant_id = $1",
        )
        .bind(participant as i64)
        .bind(count_reached as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, participant, "Failed to record correct submission");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(participant, "Participant record missing for update");
            return Err(AppError::NotFound("Participant not found".to_string()));
        }

        debug!(participant, count_reached, "Correct submission recorded");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_wrong(&self, participant: ParticipantId) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE participants
             SET score = score - 1,
                 wrong = wrong + 1
             WHERE participant_id = $1",
        )
        .bind(participant as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, participant, "Failed to record wrong submission");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(participant, "Participant record missing for update");
            return Err(AppError::NotFound("Participant not found".to_string()));
        }

        debug!(participant, "Wrong submission recorded");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rank_for_score(&self, score: i32) -> Result<u32, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS at_or_above FROM participants WHERE score >= $1")
            .bind(score)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, score, "Failed to compute rank");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(row.get::<i64, _>("at_or_above") as u32)
    }

    #[instrument(skip(self))]
    async fn top_by_score(&self, limit: u32) -> Result<Vec<ParticipantRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT participant_id, score, correct, wrong, best_count
             FROM participants
             ORDER BY score DESC, participant_id ASC
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch leaderboard");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.iter().map(Self::record_from_row).collect())
    }
}
