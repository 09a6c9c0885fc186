//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    broadcast::CompletionPayload,
    error::RoomError,
    state::{Identity, TimerSettings, TimerState},
};

/// Body of POST /rooms
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub host: Identity,
    #[serde(default)]
    pub settings: TimerSettings,
}

/// Body of POST /rooms/:room_id/timer/pause
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseRequest {
    #[serde(default)]
    pub time_remaining: Option<i64>,
}

/// Body of POST /rooms/:room_id/timer/mode
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeModeRequest {
    pub mode: String,
}

/// Body of POST /rooms/:room_id/chat
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// API response structure for timer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer_state: TimerState,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(
        status: String,
        message: String,
        timer_state: TimerState,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            message,
            timestamp,
            timer_state,
        }
    }

    /// Response whose status follows the timer's running flag
    pub fn for_timer(message: String, timer_state: TimerState, timestamp: DateTime<Utc>) -> Self {
        let status = if timer_state.is_running { "running" } else { "stopped" };
        Self::new(status.to_string(), message, timer_state, timestamp)
    }
}

/// Response of POST /rooms/:room_id/timer/complete
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub completion: CompletionPayload,
}

impl CompletionResponse {
    pub fn new(completion: CompletionPayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "completed".to_string(),
            message: format!(
                "{} interval completed, {} suggested next",
                completion.completed_mode, completion.suggested_next_mode
            ),
            timestamp,
            completion,
        }
    }
}

/// Error body returned to the requester only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp,
        }
    }
}

/// Server status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub uptime: String,
    pub rooms: usize,
    pub port: u16,
    pub host: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Room operation failure mapped onto an HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub error: RoomError,
    /// Clock reading taken when the failure was observed
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    pub fn new(error: RoomError, timestamp: DateTime<Utc>) -> Self {
        Self { error, timestamp }
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.error {
            RoomError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            RoomError::NotHost(_) => StatusCode::FORBIDDEN,
            RoomError::InvalidMode(_)
            | RoomError::EmptyMessage
            | RoomError::MessageTooLong { .. }
            | RoomError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RoomError::CompletionNotPending => StatusCode::CONFLICT,
            RoomError::StorageFailure(_) | RoomError::UnexpectedFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.error.is_internal() {
            error!("Request failed: {}", self.error);
        }
        let body = ErrorResponse::new(self.error.client_message(), self.timestamp);
        (self.status_code(), Json(body)).into_response()
    }
}
