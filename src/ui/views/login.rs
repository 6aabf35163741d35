//! Login screen.
//!
//! The user pastes a Google identity credential, which the backend exchanges
//! for session tokens.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{Operation, Pending};
use crate::ui::components::{centered_rect, TextInput};
use crate::ui::theme::theme;

/// Requests from the login screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginAction {
    /// Exchange the credential for session tokens.
    Submit(String),
    /// Leave the application.
    Quit,
}

/// The login screen.
pub struct LoginView {
    token_input: TextInput,
    pending: Pending,
}

impl Default for LoginView {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginView {
    pub fn new() -> Self {
        Self {
            token_input: TextInput::masked().with_placeholder("Paste your Google ID token"),
            pending: Pending::default(),
        }
    }

    fn is_signing_in(&self) -> bool {
        self.pending.is_pending(Operation::Login)
    }

    /// Called when the login request resolves.
    pub fn finish(&mut self, success: bool) {
        self.pending.finish(Operation::Login);
        if success {
            self.token_input.clear();
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<LoginAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => Some(LoginAction::Quit),
            (KeyCode::Enter, _) => {
                let token = self.token_input.value().trim().to_string();
                if token.is_empty() || !self.pending.start(Operation::Login) {
                    return None;
                }
                Some(LoginAction::Submit(token))
            }
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                let revealed = self.token_input.is_revealed();
                self.token_input.set_revealed(!revealed);
                None
            }
            _ => {
                self.token_input.handle_input(key);
                None
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let dialog = centered_rect(64, 10, area);
        let block = Block::default()
            .title(" Login ")
            .title_style(t.title())
            .borders(Borders::ALL)
            .border_style(t.border(true));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new("Sign in with your Google account").alignment(Alignment::Center),
            chunks[0],
        );
        self.token_input
            .render_with_label(frame, chunks[1], "Google ID token", !self.is_signing_in());

        let status = if self.is_signing_in() {
            Line::styled("Signing in...", Style::default().fg(t.accent))
        } else {
            Line::styled(
                "Enter to sign in, Ctrl+R to show the token",
                Style::default().fg(t.muted),
            )
        };
        frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), chunks[2]);
    }
}
