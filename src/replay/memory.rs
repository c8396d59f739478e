//! In-memory implementations of the controller's ports.
//!
//! Requests are recorded and their replies queued; the host delivers the
//! replies whenever it chooses, which lets tests hold a reply back to observe
//! the in-flight state.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::error::{StoreError, StoreOp, WindowQueryError};
use crate::note::{DeleteReason, Note, NoteId};
use crate::ports::{
    ListenerId, MessageBus, NoteStore, QueryTicket, RequestId, StoreOutcome, StoreReply,
    WindowAnswer, WindowQuery,
};
use crate::signal::{OutboundSignal, WindowId};

/// One request as the store saw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum StoreRecord {
    Create {
        request: u64,
        content: String,
        origin: String,
    },
    Update {
        request: u64,
        id: NoteId,
        content: String,
    },
    Delete {
        request: u64,
        id: NoteId,
        reason: DeleteReason,
    },
    Focus {
        id: NoteId,
    },
}

/// A note store living in a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    notes: BTreeMap<NoteId, Note>,
    focused: Option<NoteId>,
    origin: String,
    next_id: u64,
    records: Vec<StoreRecord>,
    replies: VecDeque<StoreReply>,
    fail_next: Option<StoreOp>,
    offline: bool,
    revision: u64,
}

impl MemoryStore {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Self::default()
        }
    }

    /// Seed the store with `note` and focus it.
    pub fn with_note(mut self, note: &Note) -> Self {
        if let Some(id) = &note.id {
            self.notes.insert(id.clone(), note.clone());
            self.focused = Some(id.clone());
        }
        self
    }

    /// Make the next request of kind `op` fail in its reply.
    pub const fn fail_next(&mut self, op: StoreOp) {
        self.fail_next = Some(op);
    }

    /// Reject submissions outright while offline.
    pub const fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn records(&self) -> &[StoreRecord] {
        &self.records
    }

    /// Records other than focus changes.
    pub fn mutations(&self) -> Vec<&StoreRecord> {
        self.records
            .iter()
            .filter(|r| !matches!(r, StoreRecord::Focus { .. }))
            .collect()
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Bumped whenever a note or the focus changes.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// The focused note, or an empty draft when nothing is focused.
    pub fn focused_note(&self) -> Note {
        self.focused
            .as_ref()
            .and_then(|id| self.notes.get(id))
            .cloned()
            .unwrap_or_else(|| Note::draft(self.origin.clone()))
    }

    /// Replace a stored note's content as if another window edited it.
    pub fn edit_remotely(&mut self, id: &NoteId, content: &str) {
        if let Some(note) = self.notes.get_mut(id) {
            note.content = content.to_string();
            self.revision += 1;
        }
    }

    /// Drain the queued replies, oldest first.
    pub fn take_replies(&mut self) -> Vec<StoreReply> {
        self.replies.drain(..).collect()
    }

    fn submit(&mut self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }

    fn should_fail(&mut self, op: StoreOp) -> bool {
        self.fail_next.take_if(|next| *next == op).is_some()
    }

    fn reply(&mut self, request: RequestId, outcome: StoreOutcome) {
        self.replies.push_back(StoreReply { request, outcome });
    }
}

impl NoteStore for MemoryStore {
    fn create_note(
        &mut self,
        request: RequestId,
        content: &str,
        origin: &str,
    ) -> Result<(), StoreError> {
        self.submit()?;
        self.records.push(StoreRecord::Create {
            request: request.0,
            content: content.to_string(),
            origin: origin.to_string(),
        });
        if self.should_fail(StoreOp::Create) {
            let err = StoreError::Rejected("injected create failure".to_string());
            self.reply(request, StoreOutcome::Created(Err(err)));
            return Ok(());
        }
        self.next_id += 1;
        let id = NoteId::new(format!("note-{}", self.next_id));
        self.notes.insert(
            id.clone(),
            Note {
                id: Some(id.clone()),
                content: content.to_string(),
                origin: origin.to_string(),
            },
        );
        self.revision += 1;
        self.reply(request, StoreOutcome::Created(Ok(id)));
        Ok(())
    }

    fn update_note(
        &mut self,
        request: RequestId,
        id: &NoteId,
        content: &str,
    ) -> Result<(), StoreError> {
        self.submit()?;
        self.records.push(StoreRecord::Update {
            request: request.0,
            id: id.clone(),
            content: content.to_string(),
        });
        let outcome = if self.should_fail(StoreOp::Update) {
            Err(StoreError::Rejected("injected update failure".to_string()))
        } else if let Some(note) = self.notes.get_mut(id) {
            note.content = content.to_string();
            self.revision += 1;
            Ok(())
        } else {
            Err(StoreError::NotFound(id.clone()))
        };
        self.reply(request, StoreOutcome::Updated(outcome));
        Ok(())
    }

    fn delete_note(
        &mut self,
        request: RequestId,
        id: &NoteId,
        reason: DeleteReason,
    ) -> Result<(), StoreError> {
        self.submit()?;
        self.records.push(StoreRecord::Delete {
            request: request.0,
            id: id.clone(),
            reason,
        });
        let outcome = if self.should_fail(StoreOp::Delete) {
            Err(StoreError::Rejected("injected delete failure".to_string()))
        } else if self.notes.remove(id).is_some() {
            if self.focused.as_ref() == Some(id) {
                self.focused = None;
            }
            self.revision += 1;
            Ok(())
        } else {
            Err(StoreError::NotFound(id.clone()))
        };
        self.reply(request, StoreOutcome::Deleted(outcome));
        Ok(())
    }

    fn set_focused_note(&mut self, id: &NoteId) {
        self.records.push(StoreRecord::Focus { id: id.clone() });
        self.focused = Some(id.clone());
        self.revision += 1;
    }
}

/// A broadcast channel that remembers what was emitted.
#[derive(Debug, Default)]
pub struct RecordingBus {
    next_listener: u64,
    listener: Option<ListenerId>,
    emitted: Vec<OutboundSignal>,
}

impl RecordingBus {
    pub const fn is_subscribed(&self) -> bool {
        self.listener.is_some()
    }

    pub fn emitted(&self) -> &[OutboundSignal] {
        &self.emitted
    }
}

impl MessageBus for RecordingBus {
    fn subscribe(&mut self) -> ListenerId {
        self.next_listener += 1;
        let listener = ListenerId(self.next_listener);
        self.listener = Some(listener);
        listener
    }

    fn unsubscribe(&mut self, listener: ListenerId) {
        if self.listener == Some(listener) {
            self.listener = None;
        }
    }

    fn emit(&mut self, signal: OutboundSignal) {
        self.emitted.push(signal);
    }
}

/// Answers active-window queries from a settable value.
#[derive(Debug, Default)]
pub struct ScriptedWindows {
    active: Option<WindowId>,
    queries: VecDeque<QueryTicket>,
}

impl ScriptedWindows {
    pub fn new(active: Option<WindowId>) -> Self {
        Self {
            active,
            queries: VecDeque::new(),
        }
    }

    pub fn set_active(&mut self, active: Option<WindowId>) {
        self.active = active;
    }

    /// Drain the outstanding queries, oldest first.
    pub fn take_queries(&mut self) -> Vec<QueryTicket> {
        self.queries.drain(..).collect()
    }

    /// The answer the host would give right now.
    pub fn answer(&self) -> WindowAnswer {
        self.active
            .clone()
            .ok_or_else(|| WindowQueryError::Unavailable("no window has focus".to_string()))
    }
}

impl WindowQuery for ScriptedWindows {
    fn request_active_window(&mut self, ticket: QueryTicket) {
        self.queries.push_back(ticket);
    }
}
