//! Note records as seen by the controller.
//!
//! The store owns note lifetime; the controller only reads the currently
//! focused note and proposes create/update/delete operations against it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Markup pushed into the editor when a note has no content.
pub const EMPTY_PARAGRAPH: &str = "<p></p>";

/// Markup some editors produce for a paragraph holding only a non-breaking space.
pub const NBSP_PARAGRAPH: &str = "<p>&nbsp;</p>";

/// Longest entity name, `&` and `;` excluded, read as a character reference.
pub const MAX_ENTITY_LEN: usize = 8;

/// Store-assigned identifier of a persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A note as observed in the store.
///
/// A note without an `id` is a draft that has never been persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: Option<NoteId>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub origin: String,
}

impl Note {
    /// An unsaved, empty note.
    pub fn draft(origin: impl Into<String>) -> Self {
        Self {
            id: None,
            content: String::new(),
            origin: origin.into(),
        }
    }

    /// A note that already exists in the store.
    pub fn persisted(id: impl Into<NoteId>, content: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            content: content.into(),
            origin: String::new(),
        }
    }

    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Content to show in the editor, substituting the empty paragraph for
    /// absent content.
    pub fn display_content(&self) -> &str {
        if self.content.is_empty() {
            EMPTY_PARAGRAPH
        } else {
            &self.content
        }
    }
}

/// Why a note is being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteReason {
    /// The user cleared every character of a persisted note.
    FromBlankNote,
}

impl DeleteReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FromBlankNote => "from-blank-note",
        }
    }
}

/// Whether serialized editor content carries no user text.
pub fn is_blank_content(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.is_empty() || trimmed == NBSP_PARAGRAPH || trimmed == EMPTY_PARAGRAPH
}

/// Whether two serialized contents show the same thing to the user.
pub fn same_content(a: &str, b: &str) -> bool {
    a == b || (is_blank_content(a) && is_blank_content(b))
}

/// Append `text` to `out` with `&`, `<` and `>` escaped.
pub fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

/// Whether `ch` may appear in an entity name such as `amp` or `#160`.
pub const fn is_entity_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '#'
}
