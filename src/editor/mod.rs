//! The editing surface as seen by the controller.
//!
//! [`EditorHandle`] is the only rendering touchpoint: the controller reads and
//! writes serialized rich text through it and drains its change events.
//! [`EditorBuffer`] is a rope-backed in-memory implementation used by the
//! replay host and the tests.

mod buffer;

pub use buffer::EditorBuffer;

use crate::signal::EditorStats;

/// How the editing surface classifies a mutation of its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    /// Freeform typing by the user.
    Keystroke,
    /// A block changed type or attributes without its text changing.
    Rename,
    /// Content inserted as a unit (paste, appended block).
    Insert,
    /// Content replaced wholesale by the program.
    Transparent,
}

impl ChangeKind {
    /// Structural changes sync regardless of focus.
    pub const fn is_structural(self) -> bool {
        !matches!(self, Self::Keystroke)
    }
}

/// Capabilities of a live editing surface.
pub trait EditorHandle {
    /// Serialized content currently shown.
    fn content(&self) -> String;

    /// Replace the whole content.
    fn set_content(&mut self, content: &str);

    /// Append serialized markup after the existing content.
    fn insert_at_end(&mut self, markup: &str);

    fn focus(&mut self);

    fn is_focused(&self) -> bool;

    /// Release the surface; no further mutation is valid afterwards.
    fn destroy(&mut self);

    /// Drain the change events emitted since the previous call, oldest first.
    fn take_changes(&mut self) -> Vec<ChangeKind>;

    fn stats(&self) -> EditorStats {
        EditorStats::from_markup(&self.content())
    }
}
