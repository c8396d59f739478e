//! Capabilities injected into the controller by its host.
//!
//! Every asynchronous port is fire-and-forget: the controller passes an
//! identifier with the request and the host hands the result back through
//! [`SyncController::on_store_reply`](crate::sync::SyncController::on_store_reply)
//! or [`SyncController::on_active_window`](crate::sync::SyncController::on_active_window).

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, WindowQueryError};
use crate::note::{DeleteReason, NoteId};
use crate::signal::{OutboundSignal, WindowId};

/// Correlates a store request with its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Correlates an active-window query with its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryTicket(pub u64);

/// Handle returned by [`MessageBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Persistence layer for notes.
///
/// An `Err` from a submission means the request never left; otherwise the
/// outcome arrives later as a [`StoreReply`].
pub trait NoteStore {
    fn create_note(
        &mut self,
        request: RequestId,
        content: &str,
        origin: &str,
    ) -> Result<(), StoreError>;

    fn update_note(&mut self, request: RequestId, id: &NoteId, content: &str)
    -> Result<(), StoreError>;

    fn delete_note(
        &mut self,
        request: RequestId,
        id: &NoteId,
        reason: DeleteReason,
    ) -> Result<(), StoreError>;

    fn set_focused_note(&mut self, id: &NoteId);
}

/// Completion of a store request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReply {
    pub request: RequestId,
    pub outcome: StoreOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Created(Result<NoteId, StoreError>),
    Updated(Result<(), StoreError>),
    Deleted(Result<(), StoreError>),
}

/// Broadcast channel shared by every window of the host application.
pub trait MessageBus {
    /// Start delivering inbound signals to this controller.
    fn subscribe(&mut self) -> ListenerId;

    /// Stop delivering inbound signals to `listener`.
    fn unsubscribe(&mut self, listener: ListenerId);

    fn emit(&mut self, signal: OutboundSignal);
}

/// Asks the host which window currently has focus.
pub trait WindowQuery {
    fn request_active_window(&mut self, ticket: QueryTicket);
}

/// Result of an active-window query.
pub type WindowAnswer = Result<WindowId, WindowQueryError>;
