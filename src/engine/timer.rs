//! Timer synchronization engine
//!
//! Every operation runs as one unit: load the room, authorize the requester,
//! apply the pure command to a local copy, persist it, then broadcast. A
//! failure at any step leaves the stored room untouched and broadcasts nothing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{
    command::{self, TimerCommand, Transition},
    guard::authorize,
};
use crate::{
    broadcast::{Broadcaster, CompletionPayload, RoomEvent},
    clock::Clock,
    error::RoomError,
    state::{Identity, Room, RoomId, TimerState},
    store::RoomStore,
};

/// Stored timer state together with its live remaining time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub timer_state: TimerState,
    pub time_remaining_now: u64,
    pub observed_at: DateTime<Utc>,
}

pub struct TimerEngine {
    store: Arc<dyn RoomStore>,
    broadcaster: Arc<dyn Broadcaster>,
    clock: Arc<dyn Clock>,
}

impl TimerEngine {
    pub fn new(
        store: Arc<dyn RoomStore>,
        broadcaster: Arc<dyn Broadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            broadcaster,
            clock,
        }
    }

    pub async fn start(&self, room_id: &RoomId, requester: &Identity) -> Result<TimerState, RoomError> {
        Ok(self.execute(room_id, requester, TimerCommand::Start).await?.state)
    }

    pub async fn pause(
        &self,
        room_id: &RoomId,
        requester: &Identity,
        time_remaining: Option<i64>,
    ) -> Result<TimerState, RoomError> {
        let command = TimerCommand::Pause { time_remaining };
        Ok(self.execute(room_id, requester, command).await?.state)
    }

    pub async fn reset(&self, room_id: &RoomId, requester: &Identity) -> Result<TimerState, RoomError> {
        Ok(self.execute(room_id, requester, TimerCommand::Reset).await?.state)
    }

    pub async fn change_mode(
        &self,
        room_id: &RoomId,
        requester: &Identity,
        mode: &str,
    ) -> Result<TimerState, RoomError> {
        let command = TimerCommand::ChangeMode {
            mode: mode.to_string(),
        };
        Ok(self.execute(room_id, requester, command).await?.state)
    }

    pub async fn complete(
        &self,
        room_id: &RoomId,
        requester: &Identity,
    ) -> Result<CompletionPayload, RoomError> {
        match self.execute(room_id, requester, TimerCommand::Complete).await?.event {
            RoomEvent::Completed(payload) => Ok(payload),
            other => Err(RoomError::UnexpectedFailure(format!(
                "complete produced a {} event",
                other.name()
            ))),
        }
    }

    /// Run a timer command for `requester` against a room
    pub async fn execute(
        &self,
        room_id: &RoomId,
        requester: &Identity,
        command: TimerCommand,
    ) -> Result<Transition, RoomError> {
        let mut room = self.load(room_id).await?;
        authorize(&room, requester)?;

        let now = self.clock.now();
        let transition = command::apply(&room.timer_state, &room.timer_settings, now, &command)?;
        room.timer_state = transition.state.clone();

        if let Err(e) = self.store.save_room(&room).await {
            error!("Failed to persist {} on room {}: {}", command.name(), room_id, e);
            return Err(e.into());
        }

        info!(
            "Room {}: {} by {} -> mode={} remaining={}s running={} cycles={}",
            room_id,
            command.name(),
            requester,
            transition.state.mode,
            transition.state.time_remaining,
            transition.state.is_running,
            transition.state.cycle_count
        );

        self.broadcaster.broadcast(room_id, transition.event.clone());
        Ok(transition)
    }

    /// Current timer state of a room with the remaining time reconciled to now
    pub async fn snapshot(&self, room_id: &RoomId) -> Result<TimerSnapshot, RoomError> {
        let room = self.load(room_id).await?;
        let now = self.clock.now();
        debug!("Snapshot of room {} at {}", room_id, now);
        Ok(TimerSnapshot {
            time_remaining_now: room.timer_state.remaining_at(now),
            timer_state: room.timer_state,
            observed_at: now,
        })
    }

    async fn load(&self, room_id: &RoomId) -> Result<Room, RoomError> {
        match self.store.load_room(room_id).await {
            Ok(Some(room)) => Ok(room),
            Ok(None) => {
                debug!("Room {} not found", room_id);
                Err(RoomError::RoomNotFound(room_id.clone()))
            }
            Err(e) => {
                error!("Failed to load room {}: {}", room_id, e);
                Err(e.into())
            }
        }
    }
}
