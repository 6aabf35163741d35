//! Single-line text field.
//!
//! Used for issue keys, file paths, edit forms and credential tokens. Fields
//! can cap their length (the edit forms mirror the backend's column limits)
//! and hide secrets behind bullets until revealed. Cursor positions count
//! characters, not bytes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::theme::theme;

/// An editable line of text.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    /// Cursor position within the value, in characters.
    cursor: usize,
    /// Whether the value is a secret.
    masked: bool,
    /// Whether a masked value is currently shown in clear.
    revealed: bool,
    placeholder: String,
    /// Maximum number of characters, if limited.
    max_len: Option<usize>,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// A field for secrets, shown as bullets.
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn with_value(value: impl Into<String>) -> Self {
        let mut input = Self::new();
        input.set_value(value);
        input
    }

    /// Limit the input to `max_len` characters.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Show or hide a masked value.
    pub fn set_revealed(&mut self, revealed: bool) {
        self.revealed = revealed;
    }

    /// Whether a masked value is shown in clear.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value, truncated to the limit, with the cursor at the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.value = match self.max_len {
            Some(max) => value.chars().take(max).collect(),
            None => value,
        };
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// What the field shows: bullets for a hidden secret.
    pub fn display_value(&self) -> String {
        if self.masked && !self.revealed {
            "•".repeat(self.char_count())
        } else {
            self.value.clone()
        }
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    /// Byte offset of a character position.
    fn byte_index(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Apply a key press. Returns whether the value changed, so callers can
    /// mirror it into their draft.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.insert_char(c),
            (KeyCode::Backspace, _) => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
                true
            }
            (KeyCode::Delete, _) => {
                if self.cursor >= self.char_count() {
                    return false;
                }
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
                true
            }
            (KeyCode::Left, KeyModifiers::NONE) => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            (KeyCode::Right, KeyModifiers::NONE) => {
                self.cursor = (self.cursor + 1).min(self.char_count());
                false
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                false
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.char_count();
                false
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                if self.value.is_empty() {
                    return false;
                }
                self.clear();
                true
            }
            // previous word
            (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                if self.cursor == 0 {
                    return false;
                }
                let end = self.byte_index(self.cursor);
                let word_start = self.value[..end]
                    .trim_end()
                    .rfind(|c: char| !c.is_alphanumeric())
                    .map(|i| i + 1)
                    .unwrap_or(0);
                let removed = self.value[word_start..end].chars().count();
                self.value.replace_range(word_start..end, "");
                self.cursor -= removed;
                true
            }
            _ => false,
        }
    }

    /// Insert a character at the cursor position, unless the limit is reached.
    fn insert_char(&mut self, c: char) -> bool {
        if self.max_len.is_some_and(|max| self.char_count() >= max) {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
        true
    }

    /// The slice of the display value that fits `width` columns while keeping
    /// the cursor visible, and the cursor column within it.
    fn visible(&self, width: usize) -> (String, usize) {
        let display = self.display_value();
        if width == 0 {
            return (String::new(), 0);
        }
        let offset = self.cursor.saturating_sub(width - 1);
        let text = display.chars().skip(offset).take(width).collect();
        (text, self.cursor - offset)
    }

    /// Render the input field with a label.
    pub fn render_with_label(&self, frame: &mut Frame, area: Rect, label: &str, focused: bool) {
        let t = theme();
        let inner_width = area.width.saturating_sub(2) as usize;

        let (text, cursor_col) = if self.value.is_empty() && !self.placeholder.is_empty() {
            (self.placeholder.clone(), 0)
        } else {
            self.visible(inner_width)
        };

        let style = if self.value.is_empty() && !self.placeholder.is_empty() {
            Style::default().fg(t.muted)
        } else if focused {
            Style::default().fg(t.focus)
        } else {
            Style::default()
        };

        let title_style = if focused { t.title() } else { Style::default() };
        let mut title = format!(" {} ", label);
        if let Some(max) = self.max_len.filter(|_| focused) {
            title = format!(" {} ({}/{}) ", label, self.char_count(), max);
        }

        let block = Block::default()
            .title(Span::styled(title, title_style))
            .borders(Borders::ALL)
            .border_style(t.border(focused));

        frame.render_widget(Paragraph::new(text).style(style).block(block), area);

        if focused && area.width > 2 && area.height > 2 {
            let cursor_x = area.x + 1 + cursor_col as u16;
            if cursor_x < area.x + area.width - 1 {
                frame.set_cursor_position(Position::new(cursor_x, area.y + 1));
            }
        }
    }
}
