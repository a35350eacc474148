use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::event::EventBus;
use crate::game::{CountingEngine, CountingService};
use crate::ledger::LedgerRepository;
use crate::settings::SettingsStore;
use crate::stats::StatsService;

/// Chat-platform snowflake identifiers, as delivered by the gateway.
pub type ParticipantId = u64;
pub type ChannelId = u64;
pub type MessageId = u64;
pub type RoleId = u64;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CountingEngine>,
    pub counting_service: Arc<CountingService>,
    pub stats_service: Arc<StatsService>,
    pub settings: Arc<dyn SettingsStore>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(
        engine: Arc<CountingEngine>,
        counting_service: Arc<CountingService>,
        stats_service: Arc<StatsService>,
        settings: Arc<dyn SettingsStore>,
        ledger: Arc<dyn LedgerRepository>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            engine,
            counting_service,
            stats_service,
            settings,
            ledger,
            event_bus,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Storage(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
