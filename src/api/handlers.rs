//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::debug;

use crate::{
    chat::ChatMessage,
    engine::TimerSnapshot,
    error::RoomError,
    state::{AppState, Room, RoomId},
};
use super::{
    requester::Requester,
    responses::{
        ApiError, ApiResponse, ChangeModeRequest, ChatRequest, CompletionResponse,
        CreateRoomRequest, HealthResponse, PauseRequest, StatusResponse,
    },
};

/// Stamp a failure with the server clock
pub(super) fn rejected(state: &AppState) -> impl Fn(RoomError) -> ApiError + '_ {
    move |err| ApiError::new(err, state.clock.now())
}

/// Handle POST /rooms - Create a room hosted by the given identity
pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    let Json(request) = body
        .map_err(|rejection| RoomError::InvalidRequest(rejection.body_text()))
        .map_err(rejected(&state))?;
    let room = state
        .create_room(request.name, request.host, request.settings)
        .await
        .map_err(rejected(&state))?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// Handle GET /rooms/:room_id/timer - Stored timer state plus live remaining time
pub async fn timer_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<TimerSnapshot>, ApiError> {
    let snapshot = state
        .engine
        .snapshot(&RoomId::new(room_id))
        .await
        .map_err(rejected(&state))?;
    Ok(Json(snapshot))
}

/// Handle POST /rooms/:room_id/timer/start - Start or resume the timer
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Requester(requester): Requester,
) -> Result<Json<ApiResponse>, ApiError> {
    let timer_state = state
        .engine
        .start(&RoomId::new(room_id), &requester)
        .await
        .map_err(rejected(&state))?;
    Ok(Json(ApiResponse::for_timer(
        "Timer started".to_string(),
        timer_state,
        state.clock.now(),
    )))
}

/// Handle POST /rooms/:room_id/timer/pause - Pause with an optional client reading
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Requester(requester): Requester,
    body: Option<Json<PauseRequest>>,
) -> Result<Json<ApiResponse>, ApiError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let timer_state = state
        .engine
        .pause(&RoomId::new(room_id), &requester, request.time_remaining)
        .await
        .map_err(rejected(&state))?;
    Ok(Json(ApiResponse::for_timer(
        "Timer paused".to_string(),
        timer_state,
        state.clock.now(),
    )))
}

/// Handle POST /rooms/:room_id/timer/reset - Restore the current mode's duration
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Requester(requester): Requester,
) -> Result<Json<ApiResponse>, ApiError> {
    let timer_state = state
        .engine
        .reset(&RoomId::new(room_id), &requester)
        .await
        .map_err(rejected(&state))?;
    Ok(Json(ApiResponse::for_timer(
        "Timer reset".to_string(),
        timer_state,
        state.clock.now(),
    )))
}

/// Handle POST /rooms/:room_id/timer/mode - Switch to another mode
pub async fn change_mode_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Requester(requester): Requester,
    Json(request): Json<ChangeModeRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let timer_state = state
        .engine
        .change_mode(&RoomId::new(room_id), &requester, &request.mode)
        .await
        .map_err(rejected(&state))?;
    Ok(Json(ApiResponse::for_timer(
        format!("Mode changed to {}", timer_state.mode),
        timer_state,
        state.clock.now(),
    )))
}

/// Handle POST /rooms/:room_id/timer/complete - Acknowledge a finished interval
pub async fn complete_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Requester(requester): Requester,
) -> Result<Json<CompletionResponse>, ApiError> {
    let completion = state
        .engine
        .complete(&RoomId::new(room_id), &requester)
        .await
        .map_err(rejected(&state))?;
    Ok(Json(CompletionResponse::new(completion, state.clock.now())))
}

/// Handle POST /rooms/:room_id/chat - Relay a chat message to the room
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Requester(requester): Requester,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    let message = state
        .chat
        .send(&RoomId::new(room_id), &requester, &request.message)
        .await
        .map_err(rejected(&state))?;
    Ok(Json(message))
}

/// Handle GET /status - Return current server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, ApiError> {
    let rooms = state
        .rooms
        .room_count()
        .await
        .map_err(|e| ApiError::new(e.into(), state.clock.now()))?;
    debug!("Status requested: {} rooms", rooms);

    Ok(Json(StatusResponse {
        uptime: state.get_uptime(),
        rooms,
        port: state.port,
        host: state.host.clone(),
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.clock.now()))
}
