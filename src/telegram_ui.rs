//! Telegram UI Components
//!
//! Transport-neutral replies plus the small formatting helpers the
//! handlers share:
//! - Reply values (text or photo, optional inline keyboard)
//! - Inline keyboard construction
//! - HTML escaping and length-bounded text assembly

use teloxide::types::{InlineKeyboardButton, InlineKeyboardButtonKind, InlineKeyboardMarkup};

/// Telegram limit for photo captions
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Telegram limit for text messages, minus headroom for markup
pub const MAX_TEXT_CHARS: usize = 4000;

/// Button labels longer than this are cut with an ellipsis
const MAX_LABEL_CHARS: usize = 40;

/// What a handler wants sent back to the chat
#[derive(Debug, Clone)]
pub enum Reply {
    Text {
        text: String,
        html: bool,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Photo {
        url: String,
        caption: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
}

impl Reply {
    /// Plain text, sent without a parse mode
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            html: false,
            keyboard: None,
        }
    }

    /// HTML-formatted text
    pub fn html(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            html: true,
            keyboard: None,
        }
    }

    /// Photo with an HTML caption
    pub fn photo(url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self::Photo {
            url: url.into(),
            caption: caption.into(),
            keyboard: None,
        }
    }

    /// Attach a keyboard; empty keyboards are dropped
    pub fn with_keyboard(mut self, markup: Option<InlineKeyboardMarkup>) -> Self {
        let markup = markup.filter(|m| m.inline_keyboard.iter().any(|row| !row.is_empty()));
        match &mut self {
            Self::Text { keyboard, .. } | Self::Photo { keyboard, .. } => *keyboard = markup,
        }
        self
    }

    /// Message text or photo caption
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text, .. } => text,
            Self::Photo { caption, .. } => caption,
        }
    }

    pub fn keyboard(&self) -> Option<&InlineKeyboardMarkup> {
        match self {
            Self::Text { keyboard, .. } | Self::Photo { keyboard, .. } => keyboard.as_ref(),
        }
    }

    /// Callback payloads of every button, in display order
    pub fn callback_payloads(&self) -> Vec<&str> {
        self.keyboard()
            .map(|k| {
                k.inline_keyboard
                    .iter()
                    .flatten()
                    .filter_map(|b| match &b.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => Some(data.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn button_count(&self) -> usize {
        self.keyboard()
            .map(|k| k.inline_keyboard.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }
}

// ============ Inline Keyboards ============

/// One button per row
pub fn column_keyboard(buttons: Vec<(String, String)>) -> Option<InlineKeyboardMarkup> {
    if buttons.is_empty() {
        return None;
    }
    let rows: Vec<Vec<InlineKeyboardButton>> = buttons
        .into_iter()
        .map(|(label, payload)| vec![InlineKeyboardButton::callback(button_label(&label), payload)])
        .collect();
    Some(InlineKeyboardMarkup::new(rows))
}

/// All buttons side by side
pub fn row_keyboard(buttons: Vec<(String, String)>) -> Option<InlineKeyboardMarkup> {
    if buttons.is_empty() {
        return None;
    }
    let row: Vec<InlineKeyboardButton> = buttons
        .into_iter()
        .map(|(label, payload)| InlineKeyboardButton::callback(button_label(&label), payload))
        .collect();
    Some(InlineKeyboardMarkup::new(vec![row]))
}

fn button_label(label: &str) -> String {
    truncate_chars(label.trim(), MAX_LABEL_CHARS)
}

// ============ Text Helpers ============

/// HTML escape for Telegram
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Cut to `max` chars, ending with an ellipsis when shortened
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Join lines, stopping before the first line that would exceed `max` chars.
/// A first line longer than `max` is truncated so the result is never empty.
pub fn join_lines_bounded(lines: &[String], max: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for (i, line) in lines.iter().enumerate() {
        if i == 0 && line.chars().count() > max {
            out = truncate_chars(line, max);
            used = out.chars().count();
            continue;
        }
        let extra = line.chars().count() + usize::from(!out.is_empty());
        if used + extra > max {
            break;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
        used += extra;
    }
    out
}

/// Split text into chunks of at most `max` chars on char boundaries
pub fn split_chunks(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        let split_at = remaining
            .char_indices()
            .take(max)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(remaining.len());
        let (chunk, rest) = remaining.split_at(split_at);
        chunks.push(chunk.to_string());
        remaining = rest;
    }
    chunks
}
