//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers, the room WebSocket
//! session and the request/response structures.

pub mod handlers;
pub mod requester;
pub mod responses;
pub mod ws;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

pub use requester::{Requester, USER_ID_HEADER};
pub use responses::ApiError;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rooms", post(create_room_handler))
        .route("/rooms/:room_id/timer", get(timer_handler))
        .route("/rooms/:room_id/timer/start", post(start_handler))
        .route("/rooms/:room_id/timer/pause", post(pause_handler))
        .route("/rooms/:room_id/timer/reset", post(reset_handler))
        .route("/rooms/:room_id/timer/mode", post(change_mode_handler))
        .route("/rooms/:room_id/timer/complete", post(complete_handler))
        .route("/rooms/:room_id/chat", post(chat_handler))
        .route("/rooms/:room_id/ws", get(ws::ws_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
