use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{BookingStatus, RoomId};

// Error types for the storage collaborator. These are infrastructure
// failures and are surfaced upward unchanged, never masked as domain errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend unavailable: {reason}")]
    Unavailable { reason: String, transient: bool },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable { transient: true, .. })
    }
}

// Domain error taxonomy. Everything except `Storage` is recoverable by the
// caller: re-search, re-prompt, or surface to the user.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("room {room_id} is no longer available for {check_in} to {check_out}")]
    Conflict {
        room_id: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("cannot {attempted} a booking in state {from:?}")]
    InvalidTransition {
        from: BookingStatus,
        attempted: &'static str,
    },

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl CoreError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CoreError::InvalidRequest(msg.into())
    }
}
