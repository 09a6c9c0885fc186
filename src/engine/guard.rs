//! Host authorization shared by every timer operation

use tracing::warn;

use crate::{
    error::RoomError,
    state::{Identity, Room},
};

/// Only the room's host may mutate its timer
pub fn authorize(room: &Room, requester: &Identity) -> Result<(), RoomError> {
    if room.is_host(requester) {
        Ok(())
    } else {
        warn!("Rejected timer operation on room {} by non-host {}", room.id, requester);
        Err(RoomError::NotHost(requester.clone()))
    }
}
