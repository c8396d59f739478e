//! Inbound reconciler: pushes store-side note changes into the editor.

use crate::note::{Note, same_content};

/// What to do with a note observed in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundDecision {
    /// The editor already shows this content.
    AlreadyShown,
    /// Overwrite the editor with `content`.
    Push { content: String, switched: bool },
    /// A local edit is settling; let it win.
    Defer,
}

/// Last-writer-wins at the editor boundary.
///
/// Switching to a different note always overwrites the editor. An update to
/// the same note waits while a local edit is debouncing.
pub fn reconcile(shown: &str, current: &Note, incoming: &Note, timer_pending: bool) -> InboundDecision {
    if same_content(shown, &incoming.content) {
        return InboundDecision::AlreadyShown;
    }
    let switched = incoming.id != current.id;
    if !switched && timer_pending {
        return InboundDecision::Defer;
    }
    InboundDecision::Push {
        content: incoming.display_content().to_string(),
        switched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_is_left_alone() {
        let note = Note::persisted("n1", "<p>a</p>");
        assert_eq!(reconcile("<p>a</p>", &note, &note, false), InboundDecision::AlreadyShown);
    }

    #[test]
    fn test_blank_editor_and_absent_content_match() {
        let current = Note::persisted("n1", "<p>a</p>");
        let incoming = Note::draft("sidebar");
        assert_eq!(
            reconcile("<p>&nbsp;</p>", &current, &incoming, true),
            InboundDecision::AlreadyShown
        );
    }

    #[test]
    fn test_same_note_update_pushes_when_idle() {
        let current = Note::persisted("n1", "<p>a</p>");
        let incoming = Note::persisted("n1", "<p>b</p>");
        assert_eq!(
            reconcile("<p>a</p>", &current, &incoming, false),
            InboundDecision::Push {
                content: "<p>b</p>".to_string(),
                switched: false,
            }
        );
    }

    #[test]
    fn test_same_note_update_defers_while_debouncing() {
        let current = Note::persisted("n1", "<p>a</p>");
        let incoming = Note::persisted("n1", "<p>b</p>");
        assert_eq!(reconcile("<p>ab</p>", &current, &incoming, true), InboundDecision::Defer);
    }

    #[test]
    fn test_switch_forces_push_while_debouncing() {
        let current = Note::persisted("n1", "<p>a</p>");
        let incoming = Note::persisted("n2", "<p>other</p>");
        assert_eq!(
            reconcile("<p>ab</p>", &current, &incoming, true),
            InboundDecision::Push {
                content: "<p>other</p>".to_string(),
                switched: true,
            }
        );
    }

    #[test]
    fn test_switch_to_empty_note_pushes_empty_paragraph() {
        let current = Note::persisted("n1", "<p>a</p>");
        let incoming = Note::persisted("n2", "");
        assert_eq!(
            reconcile("<p>a</p>", &current, &incoming, false),
            InboundDecision::Push {
                content: "<p></p>".to_string(),
                switched: true,
            }
        );
    }
}
