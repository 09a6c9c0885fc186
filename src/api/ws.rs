//! Room WebSocket session
//!
//! A connected client receives every event broadcast to its room and may send
//! timer commands or chat messages. Results reach it through the room
//! broadcast like everyone else; failures are sent to this socket only.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tracing::{debug, error, info, warn};

use super::{handlers::rejected, responses::ApiError};
use crate::{
    broadcast::RoomEvent,
    engine::{TimerCommand, TimerSnapshot},
    error::RoomError,
    state::{AppState, Identity, RoomId},
};

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub user: String,
}

/// Message a client may send over the room socket
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClientCommand {
    Start,
    Pause {
        #[serde(default, rename = "timeRemaining")]
        time_remaining: Option<i64>,
    },
    Reset,
    ChangeMode { mode: String },
    Complete,
    Chat { message: String },
}

/// Handle GET /rooms/:room_id/ws - Upgrade to a room event stream
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(params): Query<WsParams>,
) -> Result<Response, ApiError> {
    let room_id = RoomId::new(room_id);
    let identity = Identity::parse(&params.user).map_err(rejected(&state))?;

    // Join the channel before reading the snapshot so no event falls between them
    let events = state.subscribe(&room_id);
    let snapshot = match state.engine.snapshot(&room_id).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            drop(events);
            state.release(&room_id);
            return Err(rejected(&state)(e));
        }
    };

    Ok(ws.on_upgrade(move |socket| async move {
        RoomSession::new(state, room_id, identity)
            .run(socket, events, snapshot)
            .await;
    }))
}

/// One client's connection to a room
pub struct RoomSession {
    state: Arc<AppState>,
    room_id: RoomId,
    identity: Identity,
}

impl RoomSession {
    pub fn new(state: Arc<AppState>, room_id: RoomId, identity: Identity) -> Self {
        Self {
            state,
            room_id,
            identity,
        }
    }

    async fn run(
        self,
        socket: WebSocket,
        mut events: broadcast::Receiver<RoomEvent>,
        snapshot: TimerSnapshot,
    ) {
        info!("{} joined room {}", self.identity, self.room_id);

        let (mut sink, mut stream) = socket.split();
        let (direct_tx, mut direct_rx) = mpsc::unbounded_channel::<String>();

        let _ = direct_tx.send(json!({ "event": "timer-state", "payload": snapshot }).to_string());

        let room_id = self.room_id.clone();
        let writer = tokio::spawn(async move {
            loop {
                let frame = tokio::select! {
                    direct = direct_rx.recv() => match direct {
                        Some(frame) => frame,
                        None => break,
                    },
                    event = events.recv() => match event {
                        Ok(event) => match serde_json::to_string(&event) {
                            Ok(frame) => frame,
                            Err(e) => {
                                error!("Failed to serialize {} event: {}", event.name(), e);
                                continue;
                            }
                        },
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Subscriber of room {} lagged, skipped {} events", room_id, skipped);
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    },
                };

                if sink.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
        });

        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if let Some(frame) = self.reply(&text).await {
                        let _ = direct_tx.send(frame);
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("WebSocket error for {} in room {}: {}", self.identity, self.room_id, e);
                    break;
                }
            }
        }

        writer.abort();
        info!("{} left room {}", self.identity, self.room_id);
    }

    /// Handle one client frame, returning the frame owed to this client alone.
    ///
    /// Successful commands answer through the room broadcast, so only a
    /// failure produces a direct reply.
    pub async fn reply(&self, text: &str) -> Option<String> {
        match self.handle_text(text).await {
            Ok(()) => None,
            Err(e) => Some(error_frame(&e.client_message())),
        }
    }

    pub async fn handle_text(&self, text: &str) -> Result<(), RoomError> {
        let command: ClientCommand = match serde_json::from_str(text) {
            Ok(command) => command,
            Err(e) => {
                debug!("Unparseable message from {}: {}", self.identity, e);
                return Err(RoomError::InvalidRequest(e.to_string()));
            }
        };

        let timer_command = match command {
            ClientCommand::Chat { message } => {
                self.state
                    .chat
                    .send(&self.room_id, &self.identity, &message)
                    .await?;
                return Ok(());
            }
            ClientCommand::Start => TimerCommand::Start,
            ClientCommand::Pause { time_remaining } => TimerCommand::Pause { time_remaining },
            ClientCommand::Reset => TimerCommand::Reset,
            ClientCommand::ChangeMode { mode } => TimerCommand::ChangeMode { mode },
            ClientCommand::Complete => TimerCommand::Complete,
        };

        self.state
            .engine
            .execute(&self.room_id, &self.identity, timer_command)
            .await?;
        Ok(())
    }
}

/// Requester-only failure notification
pub fn error_frame(message: &str) -> String {
    json!({ "event": "error", "payload": { "message": message } }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_commands_parse_by_action() {
        let command: ClientCommand =
            serde_json::from_str(r#"{"action":"pause","timeRemaining":42}"#).unwrap();
        assert_eq!(command, ClientCommand::Pause { time_remaining: Some(42) });

        let command: ClientCommand = serde_json::from_str(r#"{"action":"pause"}"#).unwrap();
        assert_eq!(command, ClientCommand::Pause { time_remaining: None });

        let command: ClientCommand =
            serde_json::from_str(r#"{"action":"change-mode","mode":"longBreak"}"#).unwrap();
        assert_eq!(command, ClientCommand::ChangeMode { mode: "longBreak".to_string() });
    }

    #[test]
    fn error_frame_carries_message_only() {
        let frame: serde_json::Value = serde_json::from_str(&error_frame("Room not found")).unwrap();
        assert_eq!(frame["event"], "error");
        assert_eq!(frame["payload"]["message"], "Room not found");
    }
}
