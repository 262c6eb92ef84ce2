//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::{
        http::{ErrorDto, HistoryQuery, MessageHistoryDto, PresenceDto},
        websocket::{MessageDto, ProfileDto},
    },
    ui::state::AppState,
    usecase::ChatError,
};

use super::bearer_token;

/// `ChatError` rendered as a JSON error response.
pub struct ApiError(ChatError);

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ChatError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ChatError::Authorization(_) => StatusCode::FORBIDDEN,
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorDto {
            code: self.0.code().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current presence snapshot.
pub async fn get_active_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PresenceDto>, ApiError> {
    state
        .connect_participant_usecase
        .authenticate(bearer_token(&headers))
        .await?;

    let users = state
        .get_active_users_usecase
        .execute()
        .iter()
        .map(ProfileDto::from)
        .collect();
    Ok(Json(PresenceDto { users }))
}

/// Message history of one cohort, oldest first.
pub async fn get_cohort_messages(
    State(state): State<Arc<AppState>>,
    Path(cohort_id): Path<String>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Result<Json<MessageHistoryDto>, ApiError> {
    let identity = state
        .connect_participant_usecase
        .authenticate(bearer_token(&headers))
        .await?;

    let (cohort_id, messages) = state
        .get_cohort_messages_usecase
        .execute(&identity, cohort_id, query.limit, query.before)
        .await?;

    // Domain Model から DTO への変換
    Ok(Json(MessageHistoryDto {
        cohort_id: cohort_id.into_string(),
        messages: messages.iter().map(MessageDto::from).collect(),
    }))
}
