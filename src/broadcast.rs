//! Room event fan-out
//!
//! Every successful room operation produces a [`RoomEvent`] that is delivered
//! to all current subscribers of the room. Delivery is best-effort: a room with
//! no subscribers, or a lagging subscriber, never fails the operation.

use std::{
    collections::HashMap,
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{
    chat::ChatMessage,
    state::{RoomId, TimerMode, TimerState},
};

/// Payload of the `completed` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionPayload {
    pub completed_mode: TimerMode,
    pub suggested_next_mode: TimerMode,
    pub cycle_count: u32,
    pub timer_state: TimerState,
}

/// Event delivered to room subscribers, serialized as `{"event": .., "payload": ..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum RoomEvent {
    Started(TimerState),
    Paused(TimerState),
    Reset(TimerState),
    ModeChanged(TimerState),
    Completed(CompletionPayload),
    ChatMessage(ChatMessage),
}

impl RoomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::Started(_) => "started",
            RoomEvent::Paused(_) => "paused",
            RoomEvent::Reset(_) => "reset",
            RoomEvent::ModeChanged(_) => "mode-changed",
            RoomEvent::Completed(_) => "completed",
            RoomEvent::ChatMessage(_) => "chat-message",
        }
    }

    /// Timer state carried by the event, if any
    pub fn timer_state(&self) -> Option<&TimerState> {
        match self {
            RoomEvent::Started(state)
            | RoomEvent::Paused(state)
            | RoomEvent::Reset(state)
            | RoomEvent::ModeChanged(state) => Some(state),
            RoomEvent::Completed(payload) => Some(&payload.timer_state),
            RoomEvent::ChatMessage(_) => None,
        }
    }
}

/// Delivers an event to every current member of a room
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, room_id: &RoomId, event: RoomEvent);
}

/// Broadcaster backed by one tokio broadcast channel per room
#[derive(Debug)]
pub struct ChannelBroadcaster {
    capacity: usize,
    channels: Mutex<HashMap<RoomId, broadcast::Sender<RoomEvent>>>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to a room's events, creating its channel on first use
    pub fn subscribe(&self, room_id: &RoomId) -> broadcast::Receiver<RoomEvent> {
        let mut channels = match self.channels.lock() {
            Ok(channels) => channels,
            Err(poisoned) => poisoned.into_inner(),
        };
        channels
            .entry(room_id.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drop a room's channel if nobody listens on it any more
    pub fn release(&self, room_id: &RoomId) {
        if let Ok(mut channels) = self.channels.lock() {
            if channels.get(room_id).is_some_and(|tx| tx.receiver_count() == 0) {
                channels.remove(room_id);
            }
        }
    }

    /// Number of live subscribers of a room
    pub fn subscriber_count(&self, room_id: &RoomId) -> usize {
        self.channels
            .lock()
            .ok()
            .and_then(|channels| channels.get(room_id).map(|tx| tx.receiver_count()))
            .unwrap_or(0)
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn broadcast(&self, room_id: &RoomId, event: RoomEvent) {
        let mut channels = match self.channels.lock() {
            Ok(channels) => channels,
            Err(e) => {
                warn!("Failed to lock room channels, dropping {} event: {}", event.name(), e);
                return;
            }
        };

        let Some(tx) = channels.get(room_id) else {
            debug!("No subscribers for room {}, dropping {} event", room_id, event.name());
            return;
        };

        let name = event.name();
        match tx.send(event) {
            Ok(receivers) => debug!("Sent {} event to {} subscribers of room {}", name, receivers, room_id),
            Err(_) => {
                debug!("All subscribers of room {} are gone, closing its channel", room_id);
                channels.remove(room_id);
            }
        }
    }
}
