use axum::{
    extract::{Path, State},
    Json,
};

use crate::shared::{AppError, AppState, ParticipantId};

use super::models::{LeaderboardEntry, ParticipantStats, ServerStats};

/// GET /stats/participants/:participant_id
pub async fn participant_stats(
    State(state): State<AppState>,
    Path(participant_id): Path<ParticipantId>,
) -> Result<Json<ParticipantStats>, AppError> {
    state
        .stats_service
        .participant_stats(participant_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Participant has never counted".to_string()))
}

/// GET /stats/server
pub async fn server_stats(State(state): State<AppState>) -> Json<ServerStats> {
    Json(state.stats_service.server_stats().await)
}

/// GET /leaderboard
pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    Ok(Json(state.stats_service.leaderboard().await?))
}
