//! State management module
//! 
//! This module contains the room and timer records and the shared service state.

pub mod app_state;
pub mod room;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use room::{Identity, Room, RoomId};
pub use timer_state::{TimerMode, TimerSettings, TimerState};
