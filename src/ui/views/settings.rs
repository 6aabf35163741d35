//! Settings modal: issue tracker credentials and AI provider tokens.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::debug;

use super::{Operation, Pending};
use crate::api::types::{AiConfigurationUpdate, AiProvider, ServerType, TrackerCredentialsUpdate};
use crate::tasks::SettingsSnapshot;
use crate::ui::components::{centered_rect, TextInput};
use crate::ui::theme::theme;

const TRACKER_TOKEN: usize = 0;
const TRACKER_URL: usize = 1;
const SERVER_TYPE: usize = 2;
/// First provider token slot; one slot per entry of [`AiProvider::ALL`].
const FIRST_PROVIDER: usize = 3;
const SLOTS: usize = FIRST_PROVIDER + AiProvider::ALL.len();

/// Requests from the settings modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    /// Persist the form: tracker credentials first, then one record per
    /// provider.
    Save {
        tracker: TrackerCredentialsUpdate,
        ai_updates: Vec<AiConfigurationUpdate>,
    },
    /// The modal was dismissed.
    Close,
}

/// The settings modal.
pub struct SettingsView {
    visible: bool,
    tracker_token: TextInput,
    tracker_url: TextInput,
    server_type: ServerType,
    provider_tokens: Vec<(AiProvider, TextInput)>,
    focus: usize,
    /// Requests in flight. Kept across `close` so a reopened modal cannot
    /// start a second load or save before the first one resolves.
    pending: Pending,
    /// Incremented on every `open`.
    openings: u64,
    /// The opening a running save was started from.
    save_opening: Option<u64>,
}

impl Default for SettingsView {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsView {
    pub fn new() -> Self {
        Self {
            visible: false,
            tracker_token: TextInput::masked(),
            tracker_url: TextInput::new().with_placeholder("https://your-company.atlassian.net"),
            server_type: ServerType::default(),
            provider_tokens: AiProvider::ALL
                .iter()
                .map(|p| (*p, TextInput::masked()))
                .collect(),
            focus: TRACKER_TOKEN,
            pending: Pending::default(),
            openings: 0,
            save_opening: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[cfg(test)]
    pub fn is_pending(&self, op: Operation) -> bool {
        self.pending.is_pending(op)
    }

    #[cfg(test)]
    pub fn server_type(&self) -> ServerType {
        self.server_type
    }

    /// Show the modal and start loading. Returns `false` if nothing should be
    /// fetched: the modal was already open, or a load from an earlier opening
    /// is still running and will seed this one.
    pub fn open(&mut self) -> bool {
        if self.visible {
            return false;
        }
        self.visible = true;
        self.openings += 1;
        self.focus = TRACKER_TOKEN;
        self.set_revealed(false);
        self.pending.start(Operation::LoadSettings)
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Fill the form with what the backend has stored.
    pub fn seed(&mut self, snapshot: SettingsSnapshot) {
        self.pending.finish(Operation::LoadSettings);
        let SettingsSnapshot {
            user,
            ai_configurations,
        } = snapshot;

        self.tracker_token.set_value(user.jira_token.unwrap_or_default());
        self.tracker_url.set_value(user.jira_url.unwrap_or_default());
        self.server_type = user.jira_version;

        for (provider, input) in &mut self.provider_tokens {
            let token = ai_configurations
                .iter()
                .find(|c| c.provider == *provider)
                .map(|c| c.token.clone())
                .unwrap_or_default();
            input.set_value(token);
        }
        debug!(
            records = ai_configurations.len(),
            "Seeded settings form"
        );
    }

    /// Loading failed; the form stays open with whatever it holds.
    pub fn load_failed(&mut self) {
        self.pending.finish(Operation::LoadSettings);
    }

    /// Called when the save sequence resolves. A successful save closes the
    /// modal, unless the user already closed the one it came from.
    pub fn finish_save(&mut self, success: bool) {
        self.pending.finish(Operation::SaveSettings);
        let same_opening = self.save_opening.take() == Some(self.openings);
        if success && same_opening {
            self.close();
        }
    }

    fn set_revealed(&mut self, revealed: bool) {
        self.tracker_token.set_revealed(revealed);
        for (_, input) in &mut self.provider_tokens {
            input.set_revealed(revealed);
        }
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            TRACKER_TOKEN => Some(&mut self.tracker_token),
            TRACKER_URL => Some(&mut self.tracker_url),
            SERVER_TYPE => None,
            n => self
                .provider_tokens
                .get_mut(n - FIRST_PROVIDER)
                .map(|(_, input)| input),
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<SettingsAction> {
        if !self.visible {
            return None;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.close();
                Some(SettingsAction::Close)
            }
            (KeyCode::Enter, _) => self.save(),
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                let revealed = !self.tracker_token.is_revealed();
                self.set_revealed(revealed);
                None
            }
            (KeyCode::Tab, _) | (KeyCode::Down, _) => {
                self.focus = (self.focus + 1) % SLOTS;
                None
            }
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => {
                self.focus = (self.focus + SLOTS - 1) % SLOTS;
                None
            }
            (KeyCode::Char(' '), _) | (KeyCode::Left, _) | (KeyCode::Right, _)
                if self.focus == SERVER_TYPE =>
            {
                self.server_type = self.server_type.toggle();
                None
            }
            _ => {
                if let Some(input) = self.focused_input() {
                    input.handle_input(key);
                }
                None
            }
        }
    }

    fn save(&mut self) -> Option<SettingsAction> {
        if self.pending.is_pending(Operation::LoadSettings) {
            return None;
        }
        if !self.pending.start(Operation::SaveSettings) {
            return None;
        }
        self.save_opening = Some(self.openings);
        let tracker = TrackerCredentialsUpdate {
            jira_token: self.tracker_token.value().trim().to_string(),
            jira_url: self.tracker_url.value().trim().to_string(),
            jira_version: self.server_type,
        };
        let ai_updates = self
            .provider_tokens
            .iter()
            .map(|(provider, input)| AiConfigurationUpdate {
                provider: *provider,
                token: input.value().trim().to_string(),
            })
            .collect();
        Some(SettingsAction::Save {
            tracker,
            ai_updates,
        })
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }
        let t = theme();
        let height = 3 * (SLOTS as u16 - 1) + 1 + 4;
        let dialog = centered_rect(70, height, area);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .title(Span::styled(" Settings ", t.title()))
            .borders(Borders::ALL)
            .border_style(t.border(true));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let mut constraints = vec![Constraint::Length(3), Constraint::Length(3), Constraint::Length(1)];
        constraints.extend(self.provider_tokens.iter().map(|_| Constraint::Length(3)));
        constraints.push(Constraint::Min(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        self.tracker_token
            .render_with_label(frame, chunks[0], "Jira token", self.focus == TRACKER_TOKEN);
        self.tracker_url
            .render_with_label(frame, chunks[1], "Jira URL", self.focus == TRACKER_URL);

        let marker = if self.focus == SERVER_TYPE {
            Style::default().fg(t.focus).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.muted)
        };
        let server_line = Line::from(
            [ServerType::Cloud, ServerType::Server]
                .iter()
                .flat_map(|s| {
                    let mark = if *s == self.server_type { "(•) " } else { "( ) " };
                    [Span::styled(mark, marker), Span::raw(format!("{}   ", s.label()))]
                })
                .collect::<Vec<_>>(),
        );
        frame.render_widget(Paragraph::new(server_line), chunks[2]);

        for (i, (provider, input)) in self.provider_tokens.iter().enumerate() {
            let label = format!("{} token", provider.name());
            input.render_with_label(
                frame,
                chunks[FIRST_PROVIDER + i],
                &label,
                self.focus == FIRST_PROVIDER + i,
            );
        }

        let status = if self.pending.is_pending(Operation::LoadSettings) {
            Line::styled("Loading...", Style::default().fg(t.accent))
        } else if self.pending.is_pending(Operation::SaveSettings) {
            Line::styled("Saving...", Style::default().fg(t.accent))
        } else {
            Line::styled(
                "Enter save · Esc close · Ctrl+R show tokens",
                Style::default().fg(t.muted),
            )
        };
        if let Some(area) = chunks.last() {
            frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), *area);
        }
    }
}
