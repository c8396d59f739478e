//! Replay host: drives a controller from a timed script.
//!
//! The host plays the parts a real application would: it feeds input to an
//! [`EditorBuffer`], delivers store replies and active-window answers, and
//! republishes the store's focused note to the controller whenever the store
//! changed, the way a live store notifies its observers. A rejected request
//! changes nothing and so publishes nothing.

pub mod memory;
pub mod script;

use tracing::{debug, info};

use crate::editor::{EditorBuffer, EditorHandle};
use crate::note::Note;
use crate::sync::{SyncConfig, SyncController};

use memory::{MemoryStore, RecordingBus, ScriptedWindows};
pub use script::{Report, Script, ScriptError, ScriptEvent, TimedEvent};

/// Upper bound on settles fired while draining after the last event.
const MAX_DRAIN_SETTLES: usize = 10_000;

type Controller = SyncController<EditorBuffer, MemoryStore, RecordingBus, ScriptedWindows>;

/// Runs one script to completion.
pub struct Replay {
    controller: Controller,
    now_ms: u64,
    errors: Vec<String>,
    /// Store revision last published to the controller.
    published: u64,
}

impl Replay {
    /// Mount a controller on the script's initial state.
    pub fn new(script: &Script, config: &SyncConfig) -> Self {
        let note = script
            .note
            .clone()
            .unwrap_or_else(|| Note::draft(config.origin.clone()));
        let store = MemoryStore::new(config.origin.clone()).with_note(&note);
        let editor = EditorBuffer::from_markup(&script.editor);
        let windows = ScriptedWindows::new(script.active_window.clone());
        let controller = SyncController::mount(
            config,
            note,
            editor,
            store,
            RecordingBus::default(),
            windows,
            0,
        );
        let published = controller.store().revision();
        Self {
            controller,
            now_ms: 0,
            errors: Vec::new(),
            published,
        }
    }

    /// Play `script`'s events in time order and drain pending settles.
    pub fn run(mut self, script: &Script) -> Report {
        let _scope = crate::perf::scope("replay.run");
        let mut events = script.events.clone();
        events.sort_by_key(|e| e.at);
        for TimedEvent { at, event } in events {
            self.advance_to(at);
            self.apply(event);
            self.pump_io();
        }
        self.drain();
        self.report()
    }

    /// Fire every settle due at or before `to`.
    fn advance_to(&mut self, to: u64) {
        while let Some(deadline) = self.controller.next_deadline()
            && deadline <= to
        {
            self.now_ms = deadline;
            let result = self.controller.tick(deadline);
            self.record(result);
            self.pump_io();
        }
        self.now_ms = self.now_ms.max(to);
    }

    fn drain(&mut self) {
        for _ in 0..MAX_DRAIN_SETTLES {
            let Some(deadline) = self.controller.next_deadline() else {
                return;
            };
            self.advance_to(deadline);
        }
        tracing::warn!("replay stopped with a settle still pending");
    }

    fn apply(&mut self, event: ScriptEvent) {
        let now = self.now_ms;
        debug!(at = now, ?event, "replay event");
        let c = &mut self.controller;
        match event {
            ScriptEvent::Type { text } => c.editor_mut().type_text(&text),
            ScriptEvent::Backspace { count } => {
                for _ in 0..count {
                    c.editor_mut().backspace();
                }
            }
            ScriptEvent::Clear => c.editor_mut().clear(),
            ScriptEvent::Rename { from, to } => {
                c.editor_mut().rename_blocks(&from, &to);
            }
            ScriptEvent::Focus => c.editor_mut().focus(),
            ScriptEvent::Blur => c.editor_mut().blur(),
            ScriptEvent::Signal { signal } => {
                let result = c.on_signal(signal, now);
                self.record(result);
            }
            ScriptEvent::ActiveWindow { window_id } => c.windows_mut().set_active(window_id),
            ScriptEvent::RemoteEdit { content } => {
                let focused = c.store().focused_note().id;
                if let Some(id) = focused {
                    c.store_mut().edit_remotely(&id, &content);
                    self.publish_if_changed();
                }
            }
            ScriptEvent::SwitchNote { note } => {
                let result = c.on_note_changed(note, now);
                self.record(result);
            }
            ScriptEvent::FailNext { op } => c.store_mut().fail_next(op),
            ScriptEvent::Offline { offline } => c.store_mut().set_offline(offline),
            ScriptEvent::Teardown => c.teardown(),
        }
        self.controller.poll_editor(now);
    }

    /// Deliver store replies and window answers until none are left.
    fn pump_io(&mut self) {
        let now = self.now_ms;
        loop {
            let replies = self.controller.store_mut().take_replies();
            let queries = self.controller.windows_mut().take_queries();
            if replies.is_empty() && queries.is_empty() {
                return;
            }
            for reply in replies {
                let result = self.controller.on_store_reply(reply, now);
                self.record(result);
                self.publish_if_changed();
            }
            for ticket in queries {
                let answer = self.controller.windows_mut().answer();
                let result = self.controller.on_active_window(ticket, answer, now);
                self.record(result);
            }
        }
    }

    fn publish_if_changed(&mut self) {
        let revision = self.controller.store().revision();
        if revision == self.published {
            return;
        }
        self.published = revision;
        let note = self.controller.store().focused_note();
        let result = self.controller.on_note_changed(note, self.now_ms);
        self.record(result);
    }

    fn record(&mut self, result: Result<(), crate::error::SyncError>) {
        if let Err(err) = result {
            let message = match std::error::Error::source(&err) {
                Some(source) => format!("{err}: {source}"),
                None => err.to_string(),
            };
            self.errors.push(message);
        }
    }

    fn report(self) -> Report {
        let c = &self.controller;
        let report = Report {
            operations: c.store().records().to_vec(),
            metrics_emitted: c.bus().emitted().len(),
            settles: c.model().settle_count,
            editor_content: c.editor().content(),
            note: c.note().clone(),
            notes: c.store().notes().cloned().collect(),
            errors: self.errors,
            finished_at: self.now_ms,
        };
        info!(
            operations = report.operations.len(),
            settles = report.settles,
            errors = report.errors.len(),
            "replay finished"
        );
        report
    }
}

/// Replay `script` with `config` and return the report.
pub fn run_script(script: &Script, config: &SyncConfig) -> Report {
    Replay::new(script, config).run(script)
}
