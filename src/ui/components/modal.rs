//! Modal dialog helpers.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::error::AppError;
use crate::ui::theme::theme;

/// Create a centered rectangle.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// A blocking dialog for errors the user must acknowledge.
#[derive(Debug, Default)]
pub struct ErrorDialog {
    title: String,
    message: String,
    hint: Option<String>,
    visible: bool,
}

impl ErrorDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an application error.
    pub fn show(&mut self, error: &AppError) {
        self.title = "Error".to_string();
        self.message = error.user_message();
        self.hint = error.suggested_action().map(str::to_string);
        self.visible = true;
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }
        let t = theme();
        let dialog = centered_rect(60, 9, area);
        frame.render_widget(Clear, dialog);

        let mut lines = vec![Line::raw(""), Line::raw(self.message.as_str())];
        if let Some(hint) = &self.hint {
            lines.push(Line::raw(""));
            lines.push(Line::styled(hint.as_str(), Style::default().fg(t.muted)));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Press Enter or Esc to dismiss",
            Style::default().fg(t.muted),
        ));

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(t.error).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.error));

        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            dialog,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[test]
    fn test_centered_rect_fits_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 10, area);
        assert_eq!(rect, Rect::new(20, 15, 60, 10));

        let small = centered_rect(60, 10, Rect::new(0, 0, 30, 5));
        assert_eq!(small.width, 30);
        assert_eq!(small.height, 5);
    }

    #[test]
    fn test_error_dialog_show_and_dismiss() {
        let mut dialog = ErrorDialog::new();
        assert!(!dialog.is_visible());

        dialog.show(&AppError::Api(ApiError::MissingToken));
        assert!(dialog.is_visible());
        assert!(dialog.message().contains("log in"));
        assert!(dialog.hint.is_some());

        dialog.dismiss();
        assert!(!dialog.is_visible());
    }
}
