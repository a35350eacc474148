use serde::{Deserialize, Serialize};

use crate::shared::ParticipantId;

/// Cumulative counting record for one participant.
///
/// Created lazily on the first submission, never deleted. `score` moves up
/// one per accepted submission and down one per rejected submission, so it
/// can go negative; `best_count` is the highest count the participant ever
/// validly contributed to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub participant_id: ParticipantId,
    pub score: i32,
    pub correct: u32,
    pub wrong: u32,
    pub best_count: u32,
}

impl ParticipantRecord {
    /// A fresh record with all counters at zero
    pub fn new(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            ..Self::default()
        }
    }
}
