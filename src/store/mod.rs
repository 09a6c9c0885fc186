//! Room persistence
//!
//! The engine relies on the store for atomicity: [`RoomStore::save_room`] must
//! reject a write whose `version` no longer matches the stored room, so two
//! operations racing on the same room cannot both land.

pub mod memory;

use async_trait::async_trait;

use crate::{
    error::StoreError,
    state::{Room, RoomId},
};

pub use memory::InMemoryRoomStore;

/// Room store trait for persistence operations
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Load a room, or `None` if it does not exist
    async fn load_room(&self, room_id: &RoomId) -> Result<Option<Room>, StoreError>;

    /// Persist a previously loaded room. Fails with [`StoreError::Conflict`]
    /// if the stored version moved since the load.
    async fn save_room(&self, room: &Room) -> Result<(), StoreError>;

    /// Store a newly created room
    async fn insert_room(&self, room: Room) -> Result<(), StoreError>;

    async fn room_count(&self) -> Result<usize, StoreError>;
}
