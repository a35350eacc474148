use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::shared::{AppError, AppState, ChannelId, RoleId};

use super::models::GameSettings;

#[derive(Debug, Deserialize)]
pub struct SetChannelRequest {
    pub channel_id: ChannelId,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role_id: RoleId,
}

/// GET /settings
pub async fn get_settings(State(state): State<AppState>) -> Json<GameSettings> {
    Json(state.settings.get().await)
}

/// PUT /settings/channel
pub async fn set_channel(
    State(state): State<AppState>,
    Json(request): Json<SetChannelRequest>,
) -> Result<Json<GameSettings>, AppError> {
    let settings = state.settings.set_channel(request.channel_id).await?;
    info!(channel_id = request.channel_id, "Counting channel configured");
    Ok(Json(settings))
}

/// PUT /settings/roles/failed
pub async fn set_failed_role(
    State(state): State<AppState>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<GameSettings>, AppError> {
    let settings = state.settings.set_failed_role(Some(request.role_id)).await?;
    info!(role_id = request.role_id, "Failed role configured");
    Ok(Json(settings))
}

/// DELETE /settings/roles/failed
pub async fn remove_failed_role(
    State(state): State<AppState>,
) -> Result<Json<GameSettings>, AppError> {
    let settings = state.settings.set_failed_role(None).await?;
    info!("Failed role feature disabled");
    Ok(Json(settings))
}

/// PUT /settings/roles/reliable
pub async fn set_reliable_role(
    State(state): State<AppState>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<GameSettings>, AppError> {
    let settings = state
        .settings
        .set_reliable_role(Some(request.role_id))
        .await?;
    info!(role_id = request.role_id, "Reliable role configured");
    Ok(Json(settings))
}

/// DELETE /settings/roles/reliable
pub async fn remove_reliable_role(
    State(state): State<AppState>,
) -> Result<Json<GameSettings>, AppError> {
    let settings = state.settings.set_reliable_role(None).await?;
    info!("Reliable role feature disabled");
    Ok(Json(settings))
}
