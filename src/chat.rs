//! Chat relay: validate a message, then broadcast it to the room

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    broadcast::{Broadcaster, RoomEvent},
    clock::Clock,
    error::RoomError,
    state::{Identity, RoomId},
    store::RoomStore,
};

/// Default upper bound on message length, in characters
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Identity,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// Stateless relay; nothing is stored
pub struct ChatRelay {
    store: Arc<dyn RoomStore>,
    broadcaster: Arc<dyn Broadcaster>,
    clock: Arc<dyn Clock>,
    max_chars: usize,
}

impl ChatRelay {
    pub fn new(
        store: Arc<dyn RoomStore>,
        broadcaster: Arc<dyn Broadcaster>,
        clock: Arc<dyn Clock>,
        max_chars: usize,
    ) -> Self {
        Self {
            store,
            broadcaster,
            clock,
            max_chars,
        }
    }

    pub async fn send(
        &self,
        room_id: &RoomId,
        sender: &Identity,
        text: &str,
    ) -> Result<ChatMessage, RoomError> {
        let room = self.store.load_room(room_id).await.map_err(|e| {
            error!("Failed to load room {} for chat: {}", room_id, e);
            RoomError::from(e)
        })?;
        if room.is_none() {
            return Err(RoomError::RoomNotFound(room_id.clone()));
        }

        let message = validate_message(text, self.max_chars)?;
        let chat = ChatMessage {
            id: Uuid::new_v4(),
            sender: sender.clone(),
            message,
            sent_at: self.clock.now(),
        };

        debug!("Relaying chat message {} from {} in room {}", chat.id, sender, room_id);
        self.broadcaster
            .broadcast(room_id, RoomEvent::ChatMessage(chat.clone()));
        Ok(chat)
    }
}

/// Trim a message and check it is non-empty and within `max_chars`
pub fn validate_message(text: &str, max_chars: usize) -> Result<String, RoomError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RoomError::EmptyMessage);
    }
    if trimmed.chars().count() > max_chars {
        return Err(RoomError::MessageTooLong { max: max_chars });
    }
    Ok(trimmed.to_string())
}
