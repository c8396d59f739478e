use ropey::Rope;

use super::{ChangeKind, EditorHandle};
use crate::note::{EMPTY_PARAGRAPH, MAX_ENTITY_LEN, escape_text, is_blank_content, is_entity_char};

/// Char offset of the text position inside [`EMPTY_PARAGRAPH`].
const EMPTY_PARAGRAPH_CARET: usize = 3;

/// Markup inserted when the user presses Enter.
const PARAGRAPH_BREAK: &str = "</p><p>";

/// An in-memory rich-text surface backed by a rope.
///
/// The rope holds the serialized markup directly. The caret is a char index
/// into that markup and always sits inside a block's text, never inside a tag.
/// Every mutation records a [`ChangeKind`] that the controller drains through
/// [`EditorHandle::take_changes`].
pub struct EditorBuffer {
    rope: Rope,
    caret: usize,
    focused: bool,
    destroyed: bool,
    changes: Vec<ChangeKind>,
}

impl EditorBuffer {
    /// Create a buffer showing `markup`, caret at the end of the last block.
    pub fn from_markup(markup: &str) -> Self {
        let rope = Rope::from_str(markup);
        let caret = end_caret(&rope);
        Self {
            rope,
            caret,
            focused: false,
            destroyed: false,
            changes: Vec::new(),
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_markup("")
    }

    /// The caret as a char index into the markup.
    pub const fn caret(&self) -> usize {
        self.caret
    }

    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Number of pending, undrained change events.
    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }

    pub const fn blur(&mut self) {
        self.focused = false;
    }

    /// Type `text` at the caret, one keystroke per char.
    ///
    /// A newline closes the current paragraph and opens a new one. Markup
    /// characters are stored escaped.
    pub fn type_text(&mut self, text: &str) {
        if self.destroyed {
            return;
        }
        let mut keystroke = String::with_capacity(PARAGRAPH_BREAK.len());
        for ch in text.chars() {
            self.ensure_paragraph();
            keystroke.clear();
            if ch == '\n' {
                keystroke.push_str(PARAGRAPH_BREAK);
            } else {
                escape_text(ch.encode_utf8(&mut [0; 4]), &mut keystroke);
            }
            self.rope.insert(self.caret, &keystroke);
            self.caret += keystroke.chars().count();
            self.changes.push(ChangeKind::Keystroke);
        }
    }

    /// Delete the char before the caret (Backspace).
    ///
    /// An escaped char goes as a whole. Returns `true` if a char was deleted.
    /// Backspace at the start of a block is a no-op.
    pub fn backspace(&mut self) -> bool {
        if self.destroyed || self.caret == 0 {
            return false;
        }
        let width = match self.entity_before_caret() {
            Some(width) => width,
            None if self.rope.char(self.caret - 1) == '>' => return false,
            None => 1,
        };
        self.rope.remove(self.caret - width..self.caret);
        self.caret -= width;
        self.changes.push(ChangeKind::Keystroke);
        true
    }

    /// Char length of a `&name;` reference ending at the caret.
    fn entity_before_caret(&self) -> Option<usize> {
        if self.rope.char(self.caret - 1) != ';' {
            return None;
        }
        let start = self.caret.saturating_sub(MAX_ENTITY_LEN + 2);
        let before: String = self.rope.slice(start..self.caret - 1).chars().collect();
        let name = &before[before.rfind('&')? + 1..];
        (!name.is_empty() && name.chars().all(is_entity_char)).then(|| name.len() + 2)
    }

    /// Select everything and delete it.
    pub fn clear(&mut self) {
        if self.destroyed {
            return;
        }
        self.rope = Rope::new();
        self.caret = 0;
        self.changes.push(ChangeKind::Keystroke);
    }

    /// Change every `<from>` block into a `<to>` block.
    ///
    /// Returns the number of blocks renamed.
    pub fn rename_blocks(&mut self, from: &str, to: &str) -> usize {
        if self.destroyed || from == to {
            return 0;
        }
        let text = self.rope.to_string();
        let open = format!("<{from}>");
        let count = text.matches(&open).count();
        if count == 0 {
            return 0;
        }
        let renamed = text
            .replace(&open, &format!("<{to}>"))
            .replace(&format!("</{from}>"), &format!("</{to}>"));
        self.rope = Rope::from_str(&renamed);
        self.caret = end_caret(&self.rope);
        self.changes.push(ChangeKind::Rename);
        count
    }

    /// Replace a blank document with a single empty paragraph to type into.
    fn ensure_paragraph(&mut self) {
        let text = self.rope.to_string();
        if is_blank_content(&text) && text != EMPTY_PARAGRAPH {
            self.rope = Rope::from_str(EMPTY_PARAGRAPH);
            self.caret = EMPTY_PARAGRAPH_CARET;
        }
    }
}

impl EditorHandle for EditorBuffer {
    fn content(&self) -> String {
        self.rope.to_string()
    }

    fn set_content(&mut self, content: &str) {
        if self.destroyed {
            return;
        }
        self.rope = Rope::from_str(content);
        self.caret = end_caret(&self.rope);
        self.changes.push(ChangeKind::Transparent);
    }

    fn insert_at_end(&mut self, markup: &str) {
        if self.destroyed {
            return;
        }
        self.rope.insert(self.rope.len_chars(), markup);
        self.caret = end_caret(&self.rope);
        self.changes.push(ChangeKind::Insert);
    }

    fn focus(&mut self) {
        if !self.destroyed {
            self.focused = true;
        }
    }

    fn is_focused(&self) -> bool {
        self.focused && !self.destroyed
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.focused = false;
        self.changes.clear();
    }

    fn take_changes(&mut self) -> Vec<ChangeKind> {
        std::mem::take(&mut self.changes)
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field("rope", &format_args!("Rope({} chars)", self.rope.len_chars()))
            .field("caret", &self.caret)
            .field("focused", &self.focused)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

/// Caret position just before the closing tag of the last block.
fn end_caret(rope: &Rope) -> usize {
    let text = rope.to_string();
    if text.ends_with('>')
        && let Some(idx) = text.rfind("</")
    {
        return text[..idx].chars().count();
    }
    rope.len_chars()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_blank_content() {
        let buf = EditorBuffer::empty();
        assert_eq!(buf.content(), "");
        assert_eq!(buf.caret(), 0);
    }

    #[test]
    fn test_from_markup_places_caret_before_closing_tag() {
        let buf = EditorBuffer::from_markup("<p>Hello</p>");
        assert_eq!(buf.caret(), 8);
    }

    #[test]
    fn test_typing_into_empty_buffer_opens_paragraph() {
        let mut buf = EditorBuffer::empty();
        buf.type_text("Hello");
        assert_eq!(buf.content(), "<p>Hello</p>");
        assert_eq!(buf.take_changes(), vec![ChangeKind::Keystroke; 5]);
    }

    #[test]
    fn test_typing_replaces_nbsp_paragraph() {
        let mut buf = EditorBuffer::from_markup("<p>&nbsp;</p>");
        buf.type_text("a");
        assert_eq!(buf.content(), "<p>a</p>");
    }

    #[test]
    fn test_newline_splits_paragraph() {
        let mut buf = EditorBuffer::empty();
        buf.type_text("one\ntwo");
        assert_eq!(buf.content(), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_typing_appends_to_existing_last_block() {
        let mut buf = EditorBuffer::from_markup("<p>ab</p>");
        buf.type_text("c");
        assert_eq!(buf.content(), "<p>abc</p>");
    }

    #[test]
    fn test_backspace_removes_char_before_caret() {
        let mut buf = EditorBuffer::from_markup("<p>ab</p>");
        assert!(buf.backspace());
        assert_eq!(buf.content(), "<p>a</p>");
        assert_eq!(buf.take_changes(), vec![ChangeKind::Keystroke]);
    }

    #[test]
    fn test_backspace_at_block_start_is_noop() {
        let mut buf = EditorBuffer::from_markup("<p></p>");
        assert!(!buf.backspace());
        assert!(buf.take_changes().is_empty());
    }

    #[test]
    fn test_clear_empties_content() {
        let mut buf = EditorBuffer::from_markup("<p>abc</p>");
        buf.clear();
        assert_eq!(buf.content(), "");
        assert_eq!(buf.take_changes(), vec![ChangeKind::Keystroke]);
    }

    #[test]
    fn test_set_content_is_transparent_change() {
        let mut buf = EditorBuffer::empty();
        buf.set_content("<p>x</p>");
        assert_eq!(buf.content(), "<p>x</p>");
        assert_eq!(buf.take_changes(), vec![ChangeKind::Transparent]);
    }

    #[test]
    fn test_insert_at_end_is_insert_change() {
        let mut buf = EditorBuffer::from_markup("<p>a</p>");
        buf.insert_at_end("<p>b</p>");
        assert_eq!(buf.content(), "<p>a</p><p>b</p>");
        assert_eq!(buf.take_changes(), vec![ChangeKind::Insert]);
        buf.type_text("c");
        assert_eq!(buf.content(), "<p>a</p><p>bc</p>");
    }

    #[test]
    fn test_rename_blocks_is_rename_change() {
        let mut buf = EditorBuffer::from_markup("<p>a</p><p>b</p>");
        assert_eq!(buf.rename_blocks("p", "h2"), 2);
        assert_eq!(buf.content(), "<h2>a</h2><h2>b</h2>");
        assert_eq!(buf.take_changes(), vec![ChangeKind::Rename]);
        assert_eq!(buf.rename_blocks("p", "h2"), 0);
    }

    #[test]
    fn test_take_changes_drains() {
        let mut buf = EditorBuffer::empty();
        buf.type_text("ab");
        assert_eq!(buf.pending_changes(), 2);
        let _ = buf.take_changes();
        assert_eq!(buf.pending_changes(), 0);
    }

    #[test]
    fn test_focus_and_blur() {
        let mut buf = EditorBuffer::empty();
        assert!(!buf.is_focused());
        buf.focus();
        assert!(buf.is_focused());
        buf.blur();
        assert!(!buf.is_focused());
    }

    #[test]
    fn test_destroyed_buffer_ignores_mutation() {
        let mut buf = EditorBuffer::from_markup("<p>keep</p>");
        buf.focus();
        buf.destroy();
        buf.type_text("x");
        buf.set_content("<p>other</p>");
        buf.insert_at_end("<p>more</p>");
        buf.focus();
        assert_eq!(buf.content(), "<p>keep</p>");
        assert!(!buf.is_focused());
        assert!(buf.take_changes().is_empty());
    }

    #[test]
    fn test_multibyte_typing_and_backspace() {
        let mut buf = EditorBuffer::empty();
        buf.type_text("héé");
        assert!(buf.backspace());
        assert_eq!(buf.content(), "<p>hé</p>");
    }

    #[test]
    fn test_stats_use_default_markup_counting() {
        let mut buf = EditorBuffer::empty();
        buf.type_text("two words\nthree");
        let stats = buf.stats();
        assert_eq!(stats.words, 3);
        assert_eq!(stats.paragraphs, 2);
    }

    #[test]
    fn test_typed_markup_chars_are_escaped() {
        let mut buf = EditorBuffer::empty();
        buf.type_text("a<b> & c");
        assert_eq!(buf.content(), "<p>a&lt;b&gt; &amp; c</p>");
        assert_eq!(buf.pending_changes(), 8);
    }

    #[test]
    fn test_backspace_removes_escaped_char_whole() {
        let mut buf = EditorBuffer::empty();
        buf.type_text("x>");
        assert!(buf.backspace());
        assert_eq!(buf.content(), "<p>x</p>");
        buf.type_text("&");
        assert!(buf.backspace());
        assert!(buf.backspace());
        assert_eq!(buf.content(), "<p></p>");
    }

    #[test]
    fn test_stats_of_typed_ampersand() {
        let mut buf = EditorBuffer::empty();
        buf.type_text("A & B\nC");
        let stats = buf.stats();
        assert_eq!(stats.words, 4);
        assert_eq!(stats.paragraphs, 2);
    }
}
