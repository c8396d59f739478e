//! Error types surfaced by the controller and its ports.

use thiserror::Error;

use crate::note::NoteId;

/// The kind of store request that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreOp {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// Failure reported by a [`NoteStore`](crate::ports::NoteStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store rejected the request: {0}")]
    Rejected(String),
    #[error("note {0} not found")]
    NotFound(NoteId),
    #[error("store unavailable")]
    Unavailable,
}

/// Failure reported by a [`WindowQuery`](crate::ports::WindowQuery).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowQueryError {
    #[error("active window unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned to the caller of the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("{op} request failed")]
    Store {
        op: StoreOp,
        #[source]
        source: StoreError,
    },
}

impl SyncError {
    pub const fn store(op: StoreOp, source: StoreError) -> Self {
        Self::Store { op, source }
    }
}
