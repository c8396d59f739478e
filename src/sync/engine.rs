//! Note sync engine: turns settled editor content into a store request.

use crate::note::{DeleteReason, Note, NoteId, is_blank_content};

/// What the store should do with a settled edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    None,
    Create { content: String, origin: String },
    Update { id: NoteId, content: String },
    Delete { id: NoteId, reason: DeleteReason },
}

/// Decide the single store request for one settle reaction.
///
/// | content   | note id | action |
/// |-----------|---------|--------|
/// | non-empty | none    | create |
/// | non-empty | some    | update |
/// | empty     | some    | delete |
/// | empty     | none    | none   |
///
/// A suppressed settle never touches the store.
pub fn react_to_settled_content(
    content: &str,
    note: &Note,
    origin: &str,
    suppressed: bool,
) -> SyncAction {
    if suppressed {
        return SyncAction::None;
    }
    match (is_blank_content(content), &note.id) {
        (false, None) => SyncAction::Create {
            content: content.to_string(),
            origin: origin.to_string(),
        },
        (false, Some(id)) => SyncAction::Update {
            id: id.clone(),
            content: content.to_string(),
        },
        (true, Some(id)) => SyncAction::Delete {
            id: id.clone(),
            reason: DeleteReason::FromBlankNote,
        },
        (true, None) => SyncAction::None,
    }
}
