//! Room timer synchronization engine
//!
//! The state machine lives in [`command`] as pure functions; [`TimerEngine`]
//! wraps it with storage, authorization and broadcast.

pub mod command;
pub mod guard;
pub mod timer;

pub use command::{apply, suggest_next_mode, TimerCommand, Transition};
pub use guard::authorize;
pub use timer::{TimerEngine, TimerSnapshot};
