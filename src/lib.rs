//! Focus Room - A shared-room Pomodoro timer server
//!
//! This library keeps one authoritative timer per room, lets only the room's
//! host drive it, reconciles elapsed time against the stored snapshot and
//! broadcasts every change to the room's subscribers.

pub mod api;
pub mod broadcast;
pub mod chat;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::TimerEngine;
pub use error::{RoomError, StoreError};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
