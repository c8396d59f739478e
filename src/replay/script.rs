//! JSON description of a replay session and the report it produces.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreOp;
use crate::note::Note;
use crate::signal::{InboundSignal, WindowId};

use super::memory::StoreRecord;

/// Errors from loading a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A session to replay against an in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Script {
    /// Window that answers active-window queries; `None` makes them fail.
    pub active_window: Option<WindowId>,
    /// Note focused in the store at mount.
    pub note: Option<Note>,
    /// Markup already in the editor at mount.
    pub editor: String,
    pub events: Vec<TimedEvent>,
}

impl Script {
    /// Read a script from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid script.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse a script from JSON text.
    ///
    /// # Errors
    /// Returns an error if the text is not a valid script.
    pub fn parse(raw: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// An event at a point on the logical clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    #[serde(default)]
    pub at: u64,
    #[serde(flatten)]
    pub event: ScriptEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScriptEvent {
    /// The user types `text`; `\n` starts a new paragraph.
    Type { text: String },
    Backspace {
        #[serde(default = "one")]
        count: usize,
    },
    /// Select all and delete.
    Clear,
    /// Change every `from` block into a `to` block.
    Rename { from: String, to: String },
    Focus,
    Blur,
    /// A message on the broadcast channel.
    Signal { signal: InboundSignal },
    /// Change which window has focus.
    ActiveWindow { window_id: Option<WindowId> },
    /// Another window edits the focused note.
    RemoteEdit { content: String },
    /// The store switches to another note.
    SwitchNote { note: Note },
    /// The next store request of this kind fails.
    FailNext { op: StoreOp },
    Offline { offline: bool },
    Teardown,
}

const fn one() -> usize {
    1
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Store requests in submission order.
    pub operations: Vec<StoreRecord>,
    pub metrics_emitted: usize,
    pub settles: u64,
    pub editor_content: String,
    pub note: Note,
    /// Notes left in the store.
    pub notes: Vec<Note>,
    pub errors: Vec<String>,
    /// Logical time of the last processed event or settle.
    pub finished_at: u64,
}

impl Report {
    /// Serialize the report as JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
