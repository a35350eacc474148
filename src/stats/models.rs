use serde::Serialize;

use crate::shared::ParticipantId;

/// One participant's counting record, with their leaderboard position.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipantStats {
    pub participant_id: ParticipantId,
    pub score: i32,
    pub correct: u32,
    pub wrong: u32,
    pub best_count: u32,
    /// 1-based: the number of participants scoring at or above this one
    pub rank: u32,
    /// Share of this participant's submissions that were correct, 0..=100
    pub accuracy: f64,
}

/// Where the game stands right now.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStats {
    pub current_count: u32,
    pub high_score: u32,
    pub last_contributor: Option<ParticipantId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub participant_id: ParticipantId,
    pub score: i32,
}
