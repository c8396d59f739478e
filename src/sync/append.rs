//! Append listener: "send text to current note".

use crate::note::{escape_text, is_blank_content};

/// An append waiting for the active-window answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAppend {
    pub window_id: String,
    pub text: String,
}

/// How the block gets into the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendPlan {
    /// The editor only shows a blank sentinel; replace it with the block.
    Replace(String),
    /// Add the block after the existing content.
    Append(String),
}

/// Only the window the signal was addressed to acts on it.
pub fn targets_window(signal_window: &str, active_window: &str) -> bool {
    signal_window == active_window
}

/// Wrap `text` in a paragraph, escaping markup characters.
pub fn paragraph_block(text: &str) -> String {
    let mut block = String::with_capacity(text.len() + 7);
    block.push_str("<p>");
    escape_text(text, &mut block);
    block.push_str("</p>");
    block
}

pub fn plan_append(current: &str, text: &str) -> AppendPlan {
    let block = paragraph_block(text);
    if is_blank_content(current) {
        AppendPlan::Replace(block)
    } else {
        AppendPlan::Append(block)
    }
}
