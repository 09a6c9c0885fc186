//! In-memory room store with optimistic versioning

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::RoomStore;
use crate::{
    error::StoreError,
    state::{Room, RoomId},
};

#[derive(Debug, Default)]
pub struct InMemoryRoomStore {
    rooms: RwLock<HashMap<RoomId, Room>>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn load_room(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.rooms.read().await.get(room_id).cloned())
    }

    async fn save_room(&self, room: &Room) -> Result<(), StoreError> {
        let mut rooms = self.rooms.write().await;
        let stored = rooms
            .get_mut(&room.id)
            .ok_or_else(|| StoreError::Missing(room.id.clone()))?;

        if stored.version != room.version {
            return Err(StoreError::Conflict(room.id.clone()));
        }

        *stored = Room {
            version: room.version + 1,
            ..room.clone()
        };
        debug!("Saved room {} at version {}", room.id, stored.version);
        Ok(())
    }

    async fn insert_room(&self, room: Room) -> Result<(), StoreError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.id) {
            return Err(StoreError::AlreadyExists(room.id));
        }
        rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn room_count(&self) -> Result<usize, StoreError> {
        Ok(self.rooms.read().await.len())
    }
}
