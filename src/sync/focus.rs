//! Focus gate: decides whether a settle is trusted as a real edit.

use crate::editor::{ChangeKind, EditorHandle};

/// Point-in-time focus query against the editing surface. Never cached.
pub fn is_editable_focused<E: EditorHandle + ?Sized>(editor: &E) -> bool {
    editor.is_focused()
}

/// A settle is honored when the user is typing into the surface, or when the
/// change that triggered it is structural.
pub const fn honors(focused: bool, trigger: ChangeKind) -> bool {
    focused || trigger.is_structural()
}
