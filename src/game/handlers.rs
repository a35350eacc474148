use axum::{extract::State, Json};
use serde::Serialize;

use crate::shared::{AppError, AppState};

use super::models::{ChatEvent, RoleDirective, SubmissionOutcome};

/// Response for POST /events/message
#[derive(Debug, Serialize)]
pub struct MessageEventResponse {
    /// False when the message was outside the game channel
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SubmissionOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<RoleDirective>,
}

/// Response for the deleted/edited event routes
#[derive(Debug, Serialize)]
pub struct RetractionEventResponse {
    pub notice_posted: bool,
}

/// POST /events/message — a chat message from the gateway
pub async fn receive_message(
    State(state): State<AppState>,
    Json(event): Json<ChatEvent>,
) -> Result<Json<MessageEventResponse>, AppError> {
    let response = match state.counting_service.handle_message(&event).await? {
        Some(submission) => MessageEventResponse {
            processed: true,
            outcome: Some(submission.outcome),
            directives: submission.directives,
        },
        None => MessageEventResponse {
            processed: false,
            outcome: None,
            directives: Vec::new(),
        },
    };
    Ok(Json(response))
}

/// POST /events/message-deleted
pub async fn receive_message_deleted(
    State(state): State<AppState>,
    Json(event): Json<ChatEvent>,
) -> Result<Json<RetractionEventResponse>, AppError> {
    let notice_posted = state.counting_service.handle_message_deleted(&event).await?;
    Ok(Json(RetractionEventResponse { notice_posted }))
}

/// POST /events/message-edited
pub async fn receive_message_edited(
    State(state): State<AppState>,
    Json(event): Json<ChatEvent>,
) -> Result<Json<RetractionEventResponse>, AppError> {
    let notice_posted = state.counting_service.handle_message_edited(&event).await?;
    Ok(Json(RetractionEventResponse { notice_posted }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{AppStateBuilder, TEST_CHANNEL};
    use crate::shared::ChannelId;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/events/message", axum::routing::post(receive_message))
            .route(
                "/events/message-deleted",
                axum::routing::post(receive_message_deleted),
            )
            .with_state(state)
    }

    fn event_request(uri: &str, channel: ChannelId, participant: u64, text: &str) -> Request<Body> {
        let event = json!({
            "participant_id": participant,
            "channel_id": channel,
            "message_id": 9000,
            "text": text,
            "member_role_ids": [],
            "sent_at": "2024-06-01T12:00:00Z",
        });
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(event.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_receive_message_accepts_a_count() {
        let state = AppStateBuilder::new().build().await;

        let response = app(state)
            .oneshot(event_request("/events/message", TEST_CHANNEL, 11, "1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let value = response_json(response).await;
        assert_eq!(value["processed"], json!(true));
        assert_eq!(value["outcome"]["result"], json!("accepted"));
        assert_eq!(value["outcome"]["count"], json!(1));
    }

    #[tokio::test]
    async fn test_receive_message_outside_game_channel() {
        let state = AppStateBuilder::new().build().await;

        let response = app(state)
            .oneshot(event_request("/events/message", 4242, 11, "1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let value = response_json(response).await;
        assert_eq!(value["processed"], json!(false));
        assert!(value.get("outcome").is_none());
    }

    #[tokio::test]
    async fn test_receive_message_deleted_posts_notice() {
        let state = AppStateBuilder::new()
            .with_game_state(crate::game::GameState {
                current_count: 3,
                current_contributor: Some(11),
                high_score: 3,
                ..crate::game::GameState::default()
            })
            .build()
            .await;

        let response = app(state)
            .oneshot(event_request(
                "/events/message-deleted",
                TEST_CHANNEL,
                11,
                "3",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let value = response_json(response).await;
        assert_eq!(value["notice_posted"], json!(true));
    }
}
