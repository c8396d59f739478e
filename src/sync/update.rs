use tracing::{debug, warn};

use crate::editor::ChangeKind;
use crate::error::{StoreOp, SyncError};
use crate::note::{DeleteReason, Note, NoteId, same_content};
use crate::ports::{QueryTicket, RequestId, StoreOutcome, StoreReply, WindowAnswer};
use crate::signal::{EditorStats, InboundSignal};

use super::SyncModel;
use super::append::{self, PendingAppend};
use super::debounce::TimerId;
use super::engine::{self, SyncAction};
use super::focus;
use super::inbound::{self, InboundDecision};
use super::model::PendingCreate;

/// Editor state read when a settle timer fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSnapshot {
    pub content: String,
    pub focused: bool,
    pub stats: EditorStats,
}

/// All events the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The editor reported a change
    RawChange { kind: ChangeKind, now_ms: u64 },
    /// The debounce timer elapsed
    TimerFired {
        timer: TimerId,
        snapshot: EditorSnapshot,
    },
    /// The store's current note changed; `shown` is what the editor displays
    NoteChanged { note: Note, shown: String },
    /// A signal arrived on the broadcast channel
    Signal(InboundSignal),
    /// Answer to an active-window query
    ActiveWindow {
        ticket: QueryTicket,
        answer: WindowAnswer,
    },
    /// A store request completed
    StoreReply(StoreReply),
    /// The editor is being unmounted
    Teardown,
}

/// Side effects requested by [`update`], performed by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CreateNote {
        request: RequestId,
        content: String,
        origin: String,
    },
    UpdateNote {
        request: RequestId,
        id: NoteId,
        content: String,
    },
    DeleteNote {
        request: RequestId,
        id: NoteId,
        reason: DeleteReason,
    },
    SetFocusedNote(NoteId),
    EmitMetrics(EditorStats),
    /// Overwrite the editor; suppression is already armed
    PushContent(String),
    QueryActiveWindow(QueryTicket),
    AppendText(String),
    /// Surface a failure to the caller
    Report(SyncError),
    Unsubscribe,
    DestroyEditor,
}

/// Pure state transition for one message.
///
/// Reads of the editor happen before the message is built; writes happen when
/// the returned effects are performed.
pub fn update(mut model: SyncModel, msg: Message) -> (SyncModel, Vec<Effect>) {
    let mut effects = Vec::new();
    match msg {
        Message::RawChange { kind, now_ms } => {
            if model.mounted {
                model.debounce.schedule(kind, now_ms);
            }
        }
        Message::TimerFired { timer, snapshot } => {
            // Cleared before the reaction so its side effects can schedule anew.
            let Some(trigger) = model.debounce.take(timer) else {
                warn!(?timer, "settle fired without a matching pending timer");
                return (model, effects);
            };
            settle(&mut model, trigger, snapshot, &mut effects);
        }
        Message::NoteChanged { note, shown } => {
            if model.mounted {
                reconcile_inbound(&mut model, note, &shown, &mut effects);
            }
        }
        Message::Signal(InboundSignal::SendToNotes { window_id, text }) => {
            if model.mounted {
                let ticket = model.next_ticket();
                model
                    .pending_appends
                    .insert(ticket, PendingAppend { window_id, text });
                effects.push(Effect::QueryActiveWindow(ticket));
            }
        }
        Message::Signal(InboundSignal::Unknown) => {}
        Message::ActiveWindow { ticket, answer } => {
            let Some(pending) = model.pending_appends.remove(&ticket) else {
                debug!(?ticket, "discarding active-window answer with no pending append");
                return (model, effects);
            };
            match answer {
                Ok(active) if append::targets_window(&pending.window_id, &active) => {
                    effects.push(Effect::AppendText(pending.text));
                }
                Ok(active) => {
                    debug!(target = %pending.window_id, %active, "append addressed to another window");
                }
                Err(err) => {
                    debug!(%err, "discarding append after failed active-window query");
                }
            }
        }
        Message::StoreReply(reply) => handle_store_reply(&mut model, reply, &mut effects),
        Message::Teardown => {
            if model.mounted {
                model.mounted = false;
                model.debounce.cancel();
                model.pending_appends.clear();
                effects.push(Effect::Unsubscribe);
                effects.push(Effect::DestroyEditor);
            }
        }
    }
    (model, effects)
}

fn settle(
    model: &mut SyncModel,
    trigger: ChangeKind,
    snapshot: EditorSnapshot,
    effects: &mut Vec<Effect>,
) {
    if !focus::honors(snapshot.focused, trigger) {
        debug!(?trigger, "ignoring unfocused settle");
        return;
    }
    model.settle_count += 1;
    let suppressed = model.echo.consume_and_check();

    let create_outstanding = model.pending_create.as_ref().is_some_and(|p| p.adoptable);
    if !suppressed && model.note.id.is_none() && create_outstanding {
        // The draft's create is outstanding; replay this once its id is known.
        model.deferred_after_create = Some(snapshot.content);
    } else {
        let action =
            engine::react_to_settled_content(&snapshot.content, &model.note, &model.origin, suppressed);
        apply_action(model, action, effects);
    }
    effects.push(Effect::EmitMetrics(snapshot.stats));
}

fn apply_action(model: &mut SyncModel, action: SyncAction, effects: &mut Vec<Effect>) {
    match action {
        SyncAction::None => {}
        SyncAction::Create { content, origin } => {
            let request = model.track_request(StoreOp::Create, None);
            model.pending_create = Some(PendingCreate {
                request,
                content: content.clone(),
                adoptable: true,
            });
            effects.push(Effect::CreateNote {
                request,
                content,
                origin,
            });
        }
        SyncAction::Update { id, content } => {
            let request = model.track_request(StoreOp::Update, Some(id.clone()));
            effects.push(Effect::UpdateNote {
                request,
                id,
                content,
            });
        }
        SyncAction::Delete { id, reason } => {
            if model.delete_in_flight(&id) {
                debug!(%id, "delete already in flight");
                return;
            }
            let request = model.track_request(StoreOp::Delete, Some(id.clone()));
            effects.push(Effect::DeleteNote {
                request,
                id,
                reason,
            });
        }
    }
}

/// Run content settled during an outstanding create against the adopted id.
fn flush_deferred(model: &mut SyncModel, created_content: &str, effects: &mut Vec<Effect>) {
    let Some(content) = model.deferred_after_create.take() else {
        return;
    };
    if content == created_content {
        return;
    }
    let action = engine::react_to_settled_content(&content, &model.note, &model.origin, false);
    apply_action(model, action, effects);
}

fn reconcile_inbound(model: &mut SyncModel, note: Note, shown: &str, effects: &mut Vec<Effect>) {
    // A republish of the note we already hold carries nothing new. The editor
    // may be ahead of it after a failed request and must keep its text.
    if model.loaded && note.id == model.note.id && note.content == model.note.content {
        return;
    }
    model.loaded = true;
    let adopting = model.note.id.is_none()
        && note.id.is_some()
        && model.pending_create.as_ref().is_some_and(|p| {
            p.adoptable && (same_content(&note.content, &p.content) || same_content(&note.content, shown))
        });
    if adopting {
        // The store published our own draft under its new id.
        model.note = note;
        if let Some(created) = model.pending_create.as_ref().map(|p| p.content.clone()) {
            flush_deferred(model, &created, effects);
        }
        return;
    }

    let decision = inbound::reconcile(shown, &model.note, &note, model.debounce.is_pending());
    if note.id != model.note.id {
        model.deferred_after_create = None;
        if let Some(pending) = model.pending_create.as_mut() {
            pending.adoptable = false;
        }
    }
    match decision {
        InboundDecision::AlreadyShown => {}
        InboundDecision::Defer => {
            debug!(id = ?note.id, "deferring inbound note while a local edit settles");
        }
        InboundDecision::Push { content, .. } => {
            model.echo.arm();
            effects.push(Effect::PushContent(content));
        }
    }
    model.note = note;
}

fn handle_store_reply(model: &mut SyncModel, reply: StoreReply, effects: &mut Vec<Effect>) {
    let StoreReply { request, outcome } = reply;
    let Some(flight) = model.in_flight.remove(&request) else {
        warn!(?request, "store reply for an unknown request");
        return;
    };
    match outcome {
        StoreOutcome::Created(Ok(id)) => {
            let pending = model.pending_create.take_if(|p| p.request == request);
            let adoptable = pending.as_ref().is_some_and(|p| p.adoptable);
            let current = model.note.id.as_ref();
            if adoptable && (current.is_none() || current == Some(&id)) {
                model.note.id = Some(id.clone());
                effects.push(Effect::SetFocusedNote(id));
                if let Some(pending) = pending {
                    flush_deferred(model, &pending.content, effects);
                }
            } else {
                debug!(%id, "note created after switching away from its draft");
            }
        }
        StoreOutcome::Created(Err(err)) => {
            let failed_draft = model.pending_create.take_if(|p| p.request == request);
            if failed_draft.is_some() && model.deferred_after_create.take().is_some() {
                debug!("dropping content settled during the failed create");
            }
            effects.push(Effect::Report(SyncError::store(flight.op, err)));
        }
        StoreOutcome::Deleted(Ok(())) => {
            if flight.note_id.is_some() && model.note.id == flight.note_id {
                model.note.id = None;
            }
        }
        StoreOutcome::Updated(Ok(())) => {}
        StoreOutcome::Updated(Err(err)) | StoreOutcome::Deleted(Err(err)) => {
            effects.push(Effect::Report(SyncError::store(flight.op, err)));
        }
    }
}
