use std::collections::BTreeMap;

use crate::error::StoreOp;
use crate::note::{Note, NoteId};
use crate::ports::{QueryTicket, RequestId};

use super::SyncConfig;
use super::append::PendingAppend;
use super::debounce::SettleDebouncer;
use super::echo::EchoSuppressor;

/// A store request that has been submitted and not yet answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub op: StoreOp,
    pub note_id: Option<NoteId>,
}

/// The create request for the current draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct PendingCreate {
    pub request: RequestId,
    pub content: String,
    /// False once the user switched away from the draft that issued it.
    pub adoptable: bool,
}

/// The complete controller state.
///
/// All state lives here; the controller only adds the ports.
pub struct SyncModel {
    /// Origin tag passed to every create
    pub origin: String,
    /// The note the editor currently represents
    pub note: Note,
    /// Whether the controller is mounted on a live editor
    pub mounted: bool,
    /// Whether a note from the store has been reconciled yet
    pub(super) loaded: bool,
    pub(super) debounce: SettleDebouncer,
    pub(super) echo: EchoSuppressor,
    pub(super) in_flight: BTreeMap<RequestId, InFlight>,
    pub(super) pending_create: Option<PendingCreate>,
    /// Content settled while the draft's create was outstanding
    pub(super) deferred_after_create: Option<String>,
    pub(super) pending_appends: BTreeMap<QueryTicket, PendingAppend>,
    /// Honored settle reactions so far
    pub settle_count: u64,
    next_request: u64,
    next_ticket: u64,
}

impl Default for SyncModel {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}

impl std::fmt::Debug for SyncModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncModel")
            .field("note", &self.note)
            .field("mounted", &self.mounted)
            .field("debouncing", &self.debounce.is_pending())
            .field("suppress_next", &self.echo.is_armed())
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl SyncModel {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            origin: config.origin.clone(),
            note: Note::draft(config.origin.clone()),
            mounted: false,
            loaded: false,
            debounce: SettleDebouncer::new(config.debounce_ms),
            echo: EchoSuppressor::default(),
            in_flight: BTreeMap::new(),
            pending_create: None,
            deferred_after_create: None,
            pending_appends: BTreeMap::new(),
            settle_count: 0,
            next_request: 0,
            next_ticket: 0,
        }
    }

    pub const fn is_debouncing(&self) -> bool {
        self.debounce.is_pending()
    }

    pub const fn suppression_armed(&self) -> bool {
        self.echo.is_armed()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.debounce.deadline()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub(super) fn track_request(&mut self, op: StoreOp, note_id: Option<NoteId>) -> RequestId {
        self.next_request += 1;
        let request = RequestId(self.next_request);
        self.in_flight.insert(request, InFlight { op, note_id });
        request
    }

    pub(super) fn next_ticket(&mut self) -> QueryTicket {
        self.next_ticket += 1;
        QueryTicket(self.next_ticket)
    }

    pub(super) fn delete_in_flight(&self, id: &NoteId) -> bool {
        self.in_flight
            .values()
            .any(|f| f.op == StoreOp::Delete && f.note_id.as_ref() == Some(id))
    }

    /// Forget a request whose submission failed before reaching the store.
    pub(super) fn abandon_request(&mut self, request: RequestId) {
        self.in_flight.remove(&request);
        if self
            .pending_create
            .as_ref()
            .is_some_and(|p| p.request == request)
        {
            self.pending_create = None;
            self.deferred_after_create = None;
        }
    }
}
