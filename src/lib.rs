// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. sync::SyncModel)
    clippy::module_name_repetitions
)]

//! # Notesync
//!
//! Keeps a live rich-text editing surface and its persisted note in sync.
//!
//! The controller:
//! - Coalesces bursts of edits into one settle per quiet period
//! - Creates, updates or deletes the note from what the editor shows
//! - Pushes store-side changes into the editor without echoing them back
//! - Appends text sent to this window over the broadcast channel
//!
//! ## Architecture
//!
//! Notesync uses The Elm Architecture (TEA) pattern:
//! - **Model**: Controller state
//! - **Message**: Editor, timer, store and channel events
//! - **Update**: Pure state transitions
//! - **Effect**: Store requests and editor writes, performed by the controller
//!
//! ## Modules
//!
//! - [`sync`]: Controller, debouncer, focus gate, echo suppression, reconciliation
//! - [`editor`]: Editing surface trait and rope-backed buffer
//! - [`note`]: Note records, blank-content rules and markup escaping
//! - [`signal`]: Broadcast channel messages and editor statistics
//! - [`ports`]: Store, broadcast channel and window capabilities
//! - [`error`]: Store, window query and controller errors
//! - [`replay`]: Scripted host with in-memory ports
//! - [`config`]: Persisted command-line defaults
//! - [`perf`]: Replay timing and the sync timeline log

pub mod config;
pub mod editor;
pub mod error;
pub mod note;
pub mod perf;
pub mod ports;
pub mod replay;
pub mod signal;
pub mod sync;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{ChangeKind, EditorBuffer, EditorHandle};
    pub use crate::error::{StoreError, SyncError};
    pub use crate::note::{Note, NoteId};
    pub use crate::ports::{MessageBus, NoteStore, StoreReply, WindowQuery};
    pub use crate::sync::{Message, SyncConfig, SyncController, SyncModel};
}
