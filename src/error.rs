//! Error types for room operations

use thiserror::Error;

use crate::state::{Identity, RoomId};

/// Message shown to requesters for internal failures
pub const GENERIC_FAILURE_MESSAGE: &str = "Operation failed";

/// Failures reported by a room store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Write conflict on room {0}: it was modified concurrently")]
    Conflict(RoomId),

    #[error("Room {0} already exists")]
    AlreadyExists(RoomId),

    #[error("Room {0} is not stored")]
    Missing(RoomId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a room operation. Only the requester is ever told about them.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room {0} not found")]
    RoomNotFound(RoomId),

    #[error("{0} is not the host of this room")]
    NotHost(Identity),

    #[error("Invalid timer mode: {0}")]
    InvalidMode(String),

    #[error("No timer completion is pending")]
    CompletionNotPending,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message exceeds {max} characters")]
    MessageTooLong { max: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] StoreError),

    #[error("Unexpected failure: {0}")]
    UnexpectedFailure(String),
}

impl RoomError {
    /// Whether the failure is internal and must not be described to clients
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            RoomError::StorageFailure(_) | RoomError::UnexpectedFailure(_)
        )
    }

    /// Human-readable message for the requester
    pub fn client_message(&self) -> String {
        match self {
            RoomError::RoomNotFound(_) => "Room not found".to_string(),
            RoomError::NotHost(_) => "Only the host can control the timer".to_string(),
            e if e.is_internal() => GENERIC_FAILURE_MESSAGE.to_string(),
            e => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_failures_hide_detail() {
        let err = RoomError::from(StoreError::Unavailable("disk on fire".to_string()));
        assert!(err.is_internal());
        assert_eq!(err.client_message(), GENERIC_FAILURE_MESSAGE);

        let err = RoomError::UnexpectedFailure("bad".to_string());
        assert_eq!(err.client_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn validation_failures_are_descriptive() {
        let err = RoomError::InvalidMode("nap".to_string());
        assert!(!err.is_internal());
        assert_eq!(err.client_message(), "Invalid timer mode: nap");
    }
}
