//! Controller state and event handling.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`SyncModel`]: The complete controller state
//! - [`Message`]: All possible events
//! - [`update`]: Pure function for state transitions
//! - [`SyncController`]: Reads the editor, dispatches messages and performs
//!   the resulting [`Effect`]s against the injected ports
//!
//! The host drives the controller with a logical millisecond clock. Every
//! entry point takes `now_ms`; the host calls [`SyncController::tick`] at or
//! after [`SyncController::next_deadline`].

pub mod append;
pub mod debounce;
pub mod echo;
mod effects;
pub mod engine;
pub mod focus;
pub mod inbound;
mod model;
mod update;

pub use model::{InFlight, SyncModel};
pub use update::{EditorSnapshot, Effect, Message, update};

use crate::editor::EditorHandle;
use crate::error::SyncError;
use crate::note::Note;
use crate::perf::{self, SyncEvent};
use crate::ports::{ListenerId, MessageBus, NoteStore, QueryTicket, StoreReply, WindowAnswer, WindowQuery};
use crate::signal::InboundSignal;

/// Default quiet period before an edit settles.
pub const DEFAULT_DEBOUNCE_MS: u64 = 50;

/// Default origin tag for created notes.
pub const DEFAULT_ORIGIN: &str = "sidebar";

/// Tunables of a controller instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub debounce_ms: u64,
    pub origin: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

impl SyncConfig {
    /// Set the quiet period before an edit settles.
    pub const fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Set the origin tag passed to every create.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }
}

/// Keeps one editing surface in sync with the store's current note.
///
/// Owns the editor exclusively while mounted. Call [`teardown`](Self::teardown)
/// before dropping it so the listener is deregistered and the editor released.
pub struct SyncController<E, S, B, W> {
    model: SyncModel,
    editor: E,
    store: S,
    bus: B,
    windows: W,
    listener: Option<ListenerId>,
}

impl<E, S, B, W> SyncController<E, S, B, W>
where
    E: EditorHandle,
    S: NoteStore,
    B: MessageBus,
    W: WindowQuery,
{
    /// Mount on `editor`, showing `note`.
    ///
    /// Subscribes to the broadcast channel and focuses the editor. If the
    /// editor does not already show the note it is loaded through the inbound
    /// path, so the load itself is never synced back.
    pub fn mount(
        config: &SyncConfig,
        note: Note,
        editor: E,
        store: S,
        mut bus: B,
        windows: W,
        now_ms: u64,
    ) -> Self {
        let listener = bus.subscribe();
        let mut model = SyncModel::new(config);
        model.mounted = true;
        let mut controller = Self {
            model,
            editor,
            store,
            bus,
            windows,
            listener: Some(listener),
        };
        controller.editor.focus();
        perf::record(
            now_ms,
            &SyncEvent::Mount {
                note: note.id.as_ref(),
                debounce_ms: config.debounce_ms,
            },
        );
        let loaded = controller.on_note_changed(note, now_ms);
        debug_assert!(loaded.is_ok(), "loading a note submitted a store request");
        controller
    }

    pub const fn model(&self) -> &SyncModel {
        &self.model
    }

    /// The note the editor currently represents.
    pub const fn note(&self) -> &Note {
        &self.model.note
    }

    pub const fn is_mounted(&self) -> bool {
        self.model.mounted
    }

    pub const fn editor(&self) -> &E {
        &self.editor
    }

    /// Mutable access for the host that renders the editor and feeds it input.
    pub const fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub const fn bus(&self) -> &B {
        &self.bus
    }

    pub const fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub const fn windows_mut(&mut self) -> &mut W {
        &mut self.windows
    }

    /// When the pending settle is due, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.model.next_deadline()
    }

    /// Feed the editor's pending change events into the debouncer.
    pub fn poll_editor(&mut self, now_ms: u64) {
        if !self.model.mounted {
            return;
        }
        for kind in self.editor.take_changes() {
            perf::record(now_ms, &SyncEvent::Change(kind));
            self.step(Message::RawChange { kind, now_ms });
        }
    }

    /// Fire the debounce timer if its quiet period has elapsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the settle's store request could not be submitted.
    pub fn tick(&mut self, now_ms: u64) -> Result<(), SyncError> {
        self.poll_editor(now_ms);
        if !self.model.mounted {
            return Ok(());
        }
        let Some(timer) = self.model.debounce.due(now_ms) else {
            return Ok(());
        };
        let snapshot = EditorSnapshot {
            content: self.editor.content(),
            focused: focus::is_editable_focused(&self.editor),
            stats: self.editor.stats(),
        };
        perf::record(
            now_ms,
            &SyncEvent::Settle {
                timer,
                focused: snapshot.focused,
            },
        );
        self.dispatch(Message::TimerFired { timer, snapshot }, now_ms)
    }

    /// The store's current note changed.
    ///
    /// # Errors
    ///
    /// Returns an error if replaying content settled during an outstanding
    /// create could not be submitted.
    pub fn on_note_changed(&mut self, note: Note, now_ms: u64) -> Result<(), SyncError> {
        self.poll_editor(now_ms);
        let shown = self.editor.content();
        self.dispatch(Message::NoteChanged { note, shown }, now_ms)
    }

    /// A signal arrived on the broadcast channel.
    ///
    /// # Errors
    ///
    /// Never fails today; shares the signature of the other entry points.
    pub fn on_signal(&mut self, signal: InboundSignal, now_ms: u64) -> Result<(), SyncError> {
        if self.listener.is_none() {
            tracing::debug!("signal delivered after the listener was removed");
            return Ok(());
        }
        self.poll_editor(now_ms);
        self.dispatch(Message::Signal(signal), now_ms)
    }

    /// Answer to a query issued through [`WindowQuery::request_active_window`].
    ///
    /// Answers arriving after teardown are discarded.
    ///
    /// # Errors
    ///
    /// Never fails today; shares the signature of the other entry points.
    pub fn on_active_window(
        &mut self,
        ticket: QueryTicket,
        answer: WindowAnswer,
        now_ms: u64,
    ) -> Result<(), SyncError> {
        self.poll_editor(now_ms);
        self.dispatch(Message::ActiveWindow { ticket, answer }, now_ms)
    }

    /// Completion of a request issued through the [`NoteStore`].
    ///
    /// # Errors
    ///
    /// Returns the store's failure, or the failure to submit a follow-up
    /// request.
    pub fn on_store_reply(&mut self, reply: StoreReply, now_ms: u64) -> Result<(), SyncError> {
        self.poll_editor(now_ms);
        self.dispatch(Message::StoreReply(reply), now_ms)
    }

    /// Cancel the pending settle, deregister the listener and release the editor.
    pub fn teardown(&mut self) {
        if let Err(err) = self.dispatch(Message::Teardown, 0) {
            tracing::warn!(error = %err, "teardown reported a store failure");
        }
    }

    fn step(&mut self, msg: Message) -> Vec<Effect> {
        let (model, effects) = update(std::mem::take(&mut self.model), msg);
        self.model = model;
        effects
    }

    fn dispatch(&mut self, msg: Message, now_ms: u64) -> Result<(), SyncError> {
        let effects = self.step(msg);
        self.run_effects(effects, now_ms)
    }
}
