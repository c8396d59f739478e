//! Messages exchanged over the host application's broadcast channel.

use serde::{Deserialize, Serialize};

use crate::note::{MAX_ENTITY_LEN, is_entity_char};

/// Identifier of a host window.
pub type WindowId = String;

/// Signals the controller listens for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum InboundSignal {
    /// Append `text` to the note open in window `window_id`.
    SendToNotes {
        #[serde(rename = "windowId")]
        window_id: WindowId,
        text: String,
    },
    /// Anything else on the channel.
    #[serde(other)]
    Unknown,
}

/// Signals the controller emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum OutboundSignal {
    MetricsChanged { context: EditorStats },
}

/// Usage statistics of the editing surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorStats {
    pub characters: usize,
    pub words: usize,
    pub paragraphs: usize,
}

impl EditorStats {
    /// Compute statistics from serialized markup, ignoring tags and entities.
    pub fn from_markup(markup: &str) -> Self {
        let mut text = String::with_capacity(markup.len());
        let mut paragraphs = 0;
        let mut in_tag = false;
        let mut tag = String::new();
        let mut chars = markup.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '<' => {
                    in_tag = true;
                    tag.clear();
                }
                '>' if in_tag => {
                    in_tag = false;
                    let name = tag.trim_start_matches('/').split_whitespace().next();
                    if !tag.starts_with('/') && matches!(name, Some("p" | "li" | "h1" | "h2" | "h3"))
                    {
                        paragraphs += 1;
                    }
                    text.push(' ');
                }
                '&' if !in_tag => {
                    // Entities count as one visible character; a bare `&` is text.
                    let mut entity = String::new();
                    while entity.len() < MAX_ENTITY_LEN
                        && let Some(next) = chars.next_if(|c| is_entity_char(*c))
                    {
                        entity.push(next);
                    }
                    if !entity.is_empty() && chars.next_if_eq(&';').is_some() {
                        text.push(if entity == "nbsp" { ' ' } else { '_' });
                    } else {
                        text.push('&');
                        text.push_str(&entity);
                    }
                }
                _ if in_tag => tag.push(ch),
                _ => text.push(ch),
            }
        }
        if paragraphs == 0 && !text.trim().is_empty() {
            paragraphs = 1;
        }

        let words = text.split_whitespace().count();
        let characters = text.split_whitespace().map(|w| w.chars().count()).sum();
        Self {
            characters,
            words,
            paragraphs,
        }
    }
}
