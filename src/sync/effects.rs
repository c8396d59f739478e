use tracing::{debug, warn};

use crate::editor::EditorHandle;
use crate::error::{StoreOp, SyncError};
use crate::perf::{self, SyncEvent};
use crate::ports::{MessageBus, NoteStore, WindowQuery};
use crate::signal::OutboundSignal;

use super::append::{self, AppendPlan};
use super::{Effect, SyncController};

impl<E, S, B, W> SyncController<E, S, B, W>
where
    E: EditorHandle,
    S: NoteStore,
    B: MessageBus,
    W: WindowQuery,
{
    /// Perform `effects` in order.
    ///
    /// Every effect runs even if an earlier one failed; the first failure is
    /// returned.
    pub(super) fn run_effects(&mut self, effects: Vec<Effect>, now_ms: u64) -> Result<(), SyncError> {
        let mut first_error = None;
        for effect in effects {
            if let Err(err) = self.run_effect(effect, now_ms) {
                warn!(error = %err, source = ?std::error::Error::source(&err), "note sync failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn run_effect(&mut self, effect: Effect, now_ms: u64) -> Result<(), SyncError> {
        match effect {
            Effect::CreateNote {
                request,
                content,
                origin,
            } => {
                perf::record(now_ms, &SyncEvent::Create { request, origin: &origin });
                self.store
                    .create_note(request, &content, &origin)
                    .map_err(|err| self.abandon(request, StoreOp::Create, err))
            }
            Effect::UpdateNote {
                request,
                id,
                content,
            } => {
                perf::record(
                    now_ms,
                    &SyncEvent::Update {
                        request,
                        id: &id,
                        len: content.len(),
                    },
                );
                self.store
                    .update_note(request, &id, &content)
                    .map_err(|err| self.abandon(request, StoreOp::Update, err))
            }
            Effect::DeleteNote {
                request,
                id,
                reason,
            } => {
                perf::record(
                    now_ms,
                    &SyncEvent::Delete {
                        request,
                        id: &id,
                        reason,
                    },
                );
                self.store
                    .delete_note(request, &id, reason)
                    .map_err(|err| self.abandon(request, StoreOp::Delete, err))
            }
            Effect::SetFocusedNote(id) => {
                perf::record(now_ms, &SyncEvent::Focus(&id));
                self.store.set_focused_note(&id);
                Ok(())
            }
            Effect::EmitMetrics(stats) => {
                self.bus.emit(OutboundSignal::MetricsChanged { context: stats });
                Ok(())
            }
            Effect::PushContent(content) => {
                if self.model.mounted {
                    perf::record(now_ms, &SyncEvent::Push { len: content.len() });
                    self.editor.set_content(&content);
                    self.poll_editor(now_ms);
                }
                Ok(())
            }
            Effect::QueryActiveWindow(ticket) => {
                self.windows.request_active_window(ticket);
                Ok(())
            }
            Effect::AppendText(text) => {
                if !self.model.mounted {
                    debug!("dropping append for an unmounted editor");
                    return Ok(());
                }
                match append::plan_append(&self.editor.content(), &text) {
                    AppendPlan::Replace(block) => self.editor.set_content(&block),
                    AppendPlan::Append(block) => self.editor.insert_at_end(&block),
                }
                perf::record(now_ms, &SyncEvent::Append { len: text.len() });
                self.poll_editor(now_ms);
                Ok(())
            }
            Effect::Report(err) => Err(err),
            Effect::Unsubscribe => {
                if let Some(listener) = self.listener.take() {
                    self.bus.unsubscribe(listener);
                }
                Ok(())
            }
            Effect::DestroyEditor => {
                perf::record(now_ms, &SyncEvent::Teardown);
                self.editor.destroy();
                Ok(())
            }
        }
    }

    fn abandon(
        &mut self,
        request: crate::ports::RequestId,
        op: StoreOp,
        err: crate::error::StoreError,
    ) -> SyncError {
        self.model.abandon_request(request);
        SyncError::store(op, err)
    }
}
