//! Main application state management

use std::{sync::Arc, time::Instant};

use tokio::sync::broadcast;
use tracing::{error, info};

use super::{Identity, Room, RoomId, TimerSettings};
use crate::{
    broadcast::{ChannelBroadcaster, RoomEvent},
    chat::ChatRelay,
    clock::{Clock, SystemClock},
    engine::TimerEngine,
    error::RoomError,
    store::{InMemoryRoomStore, RoomStore},
};

/// Shared state handed to every request handler
pub struct AppState {
    /// Timer synchronization engine
    pub engine: TimerEngine,
    /// Chat relay
    pub chat: ChatRelay,
    /// Room persistence
    pub rooms: Arc<dyn RoomStore>,
    /// Per-room event channels
    pub broadcaster: Arc<ChannelBroadcaster>,
    pub clock: Arc<dyn Clock>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    /// Create an AppState with an in-memory store and the system clock
    pub fn new(port: u16, host: String, channel_capacity: usize, max_chat_chars: usize) -> Self {
        Self::with_parts(
            Arc::new(InMemoryRoomStore::new()),
            Arc::new(ChannelBroadcaster::new(channel_capacity)),
            Arc::new(SystemClock::new()),
            port,
            host,
            max_chat_chars,
        )
    }

    /// Assemble an AppState from explicit collaborators
    pub fn with_parts(
        rooms: Arc<dyn RoomStore>,
        broadcaster: Arc<ChannelBroadcaster>,
        clock: Arc<dyn Clock>,
        port: u16,
        host: String,
        max_chat_chars: usize,
    ) -> Self {
        Self {
            engine: TimerEngine::new(rooms.clone(), broadcaster.clone(), clock.clone()),
            chat: ChatRelay::new(rooms.clone(), broadcaster.clone(), clock.clone(), max_chat_chars),
            rooms,
            broadcaster,
            clock,
            start_time: Instant::now(),
            port,
            host,
        }
    }

    /// Create a room hosted by `host` with a fresh stopped focus timer
    pub async fn create_room(
        &self,
        name: String,
        host: Identity,
        settings: TimerSettings,
    ) -> Result<Room, RoomError> {
        let room = Room::new(RoomId::generate(), name, host, settings, self.clock.now());
        if let Err(e) = self.rooms.insert_room(room.clone()).await {
            error!("Failed to create room {}: {}", room.id, e);
            return Err(e.into());
        }
        info!("Created room {} ({}) hosted by {}", room.id, room.name, room.host);
        Ok(room)
    }

    /// Subscribe to a room's event stream
    pub fn subscribe(&self, room_id: &RoomId) -> broadcast::Receiver<RoomEvent> {
        self.broadcaster.subscribe(room_id)
    }

    /// Forget a room channel left without subscribers
    pub fn release(&self, room_id: &RoomId) {
        self.broadcaster.release(room_id);
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
