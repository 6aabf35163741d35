//! Test case generator screen.
//!
//! An issue is looked up by key, then test cases are generated for it with the
//! chosen test type and AI provider. Generated cases can be selected, edited
//! one at a time and sent back to the issue tracker.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tracing::debug;

use super::detail::render_issue;
use super::{Operation, Pending};
use crate::api::types::{AiOption, AiProvider, Issue, TestCase, TestType};
use crate::editor::{TestCaseField, TestCaseList};
use crate::error::AppError;
use crate::events::KeyContext;
use crate::ui::components::{Spinner, TextInput};
use crate::ui::theme::theme;
use crate::validation::{validate_issue_key, IssueKeyError};

/// Requests from the test case screen to the application.
#[derive(Debug)]
pub enum TestCaseAction {
    /// Look up an issue by its validated key.
    FetchIssue(String),
    /// Generate test cases for an issue.
    Generate {
        key: String,
        test_type: TestType,
        provider: AiProvider,
    },
    /// Send the selected test cases to an issue.
    Submit { key: String, cases: Vec<TestCase> },
    /// Reload the AI provider list.
    RefreshProviders,
    /// The input was rejected before reaching the backend.
    Rejected(AppError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    KeyInput,
    List,
}

/// The test case generator screen.
pub struct TestCaseView {
    key_input: TextInput,
    /// The key of the issue last fetched successfully.
    issue_key: Option<String>,
    issue: Option<Issue>,
    test_type: TestType,
    provider: AiProvider,
    providers: Vec<AiProvider>,
    cases: TestCaseList,
    cursor: usize,
    focus: Focus,
    /// Field inputs of the edit form, in `TestCaseField::ALL` order.
    edit_inputs: [TextInput; 3],
    edit_field: usize,
    pending: Pending,
    spinner: Spinner,
}

impl TestCaseView {
    pub fn new(test_type: TestType, provider: AiProvider) -> Self {
        let edit_inputs = TestCaseField::ALL.map(|f| TextInput::new().with_max_len(f.max_len()));
        Self {
            key_input: TextInput::new().with_max_len(20).with_placeholder("PIA-30"),
            issue_key: None,
            issue: None,
            test_type,
            provider,
            providers: AiProvider::ALL.to_vec(),
            cases: TestCaseList::default(),
            cursor: 0,
            focus: Focus::KeyInput,
            edit_inputs,
            edit_field: 0,
            pending: Pending::default(),
            spinner: Spinner::default(),
        }
    }

    #[cfg(test)]
    pub fn issue_key(&self) -> Option<&str> {
        self.issue_key.as_deref()
    }

    #[cfg(test)]
    pub fn issue(&self) -> Option<&Issue> {
        self.issue.as_ref()
    }

    #[cfg(test)]
    pub fn cases(&self) -> &TestCaseList {
        &self.cases
    }

    #[cfg(test)]
    pub fn provider(&self) -> AiProvider {
        self.provider
    }

    #[cfg(test)]
    pub fn is_pending(&self, op: Operation) -> bool {
        self.pending.is_pending(op)
    }

    /// Whether key presses are going to a text field.
    pub fn is_capturing_text(&self) -> bool {
        self.focus == Focus::KeyInput || self.cases.editing_index().is_some()
    }

    /// Key hints for the footer.
    pub fn context(&self) -> KeyContext {
        if self.cases.editing_index().is_some() {
            KeyContext::Editing
        } else {
            KeyContext::TestCases
        }
    }

    // ------------------------------------------------------------------------
    // Results from the backend
    // ------------------------------------------------------------------------

    /// Store a fetched issue. Returns whether it is an epic.
    ///
    /// Cases generated for a different issue are dropped with the old issue.
    pub fn set_issue(&mut self, key: String, issue: Issue) -> bool {
        self.pending.finish(Operation::Lookup);
        if self.issue_key.as_deref() != Some(key.as_str()) && !self.cases.is_empty() {
            debug!(issue_key = %key, "New issue, dropping generated cases");
            self.cases = TestCaseList::default();
            self.cursor = 0;
        }
        let epic = issue.is_epic();
        self.issue_key = Some(key);
        self.issue = Some(issue);
        epic
    }

    /// Store generated test cases, replacing the current list.
    pub fn set_test_cases(&mut self, cases: Vec<TestCase>) {
        self.finish(Operation::Generate);
        self.cases = TestCaseList::new(cases);
        self.cursor = 0;
        self.focus = Focus::List;
    }

    /// Update the provider choices from the backend list.
    pub fn set_providers(&mut self, options: Vec<AiOption>) {
        self.pending.finish(Operation::Providers);
        let mut providers: Vec<AiProvider> = Vec::new();
        for option in options {
            if !providers.contains(&option.provider) {
                providers.push(option.provider);
            }
        }
        if providers.is_empty() {
            return;
        }
        if !providers.contains(&self.provider) {
            self.provider = providers[0];
        }
        self.providers = providers;
    }

    /// Mark an operation as resolved, whatever its outcome.
    pub fn finish(&mut self, op: Operation) {
        self.pending.finish(op);
        if op == Operation::Generate {
            self.spinner.stop();
        }
    }

    pub fn tick(&mut self) {
        self.spinner.tick();
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<TestCaseAction> {
        if self.cases.editing_index().is_some() {
            self.handle_edit_input(key);
            return None;
        }
        match self.focus {
            Focus::KeyInput => self.handle_key_input(key),
            Focus::List => self.handle_list_input(key),
        }
    }

    fn handle_key_input(&mut self, key: KeyEvent) -> Option<TestCaseAction> {
        match key.code {
            KeyCode::Enter => self.lookup(),
            KeyCode::Tab | KeyCode::Esc => {
                self.focus = Focus::List;
                None
            }
            _ => {
                self.key_input.handle_input(key);
                None
            }
        }
    }

    fn handle_list_input(&mut self, key: KeyEvent) -> Option<TestCaseAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.cursor + 1 < self.cases.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Char(' ') => {
                self.cases.toggle(self.cursor);
            }
            KeyCode::Char('e') | KeyCode::Enter => self.begin_edit(),
            KeyCode::Char('g') => return self.generate(),
            KeyCode::Char('s') => return self.submit(),
            KeyCode::Char('t') => self.test_type = self.test_type.toggle(),
            KeyCode::Char('p') => self.next_provider(),
            KeyCode::Char('r') => {
                if self.pending.start(Operation::Providers) {
                    return Some(TestCaseAction::RefreshProviders);
                }
            }
            KeyCode::Char('/') | KeyCode::Tab => self.focus = Focus::KeyInput,
            _ => {}
        }
        None
    }

    fn handle_edit_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.cases.cancel();
            }
            KeyCode::Enter => {
                self.cases.save();
            }
            KeyCode::Tab | KeyCode::Down => {
                self.edit_field = (self.edit_field + 1) % TestCaseField::ALL.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.edit_field =
                    (self.edit_field + TestCaseField::ALL.len() - 1) % TestCaseField::ALL.len();
            }
            _ => {
                let input = &mut self.edit_inputs[self.edit_field];
                if input.handle_input(key) {
                    let value = input.value().to_string();
                    self.cases.set_field(TestCaseField::ALL[self.edit_field], &value);
                }
            }
        }
    }

    fn lookup(&mut self) -> Option<TestCaseAction> {
        let key = match validate_issue_key(self.key_input.value().trim()) {
            Ok(key) => key.to_string(),
            Err(e) => return Some(TestCaseAction::Rejected(e.into())),
        };
        // generated cases belong to the current issue
        if self.pending.is_pending(Operation::Generate) || !self.pending.start(Operation::Lookup) {
            return None;
        }
        debug!(issue_key = %key, "Looking up issue");
        self.focus = Focus::List;
        Some(TestCaseAction::FetchIssue(key))
    }

    fn generate(&mut self) -> Option<TestCaseAction> {
        let Some(key) = self.issue_key.clone() else {
            return Some(TestCaseAction::Rejected(IssueKeyError::Empty.into()));
        };
        if !self.pending.start(Operation::Generate) {
            return None;
        }
        self.cases = TestCaseList::default();
        self.cursor = 0;
        self.spinner.start("Generating test cases...");
        Some(TestCaseAction::Generate {
            key,
            test_type: self.test_type,
            provider: self.provider,
        })
    }

    fn submit(&mut self) -> Option<TestCaseAction> {
        let Some(key) = self.issue_key.clone() else {
            return Some(TestCaseAction::Rejected(IssueKeyError::Empty.into()));
        };
        let cases = match self.cases.selected_payload() {
            Ok(cases) => cases,
            Err(e) => return Some(TestCaseAction::Rejected(e.into())),
        };
        if !self.pending.start(Operation::Submit) {
            return None;
        }
        Some(TestCaseAction::Submit { key, cases })
    }

    fn begin_edit(&mut self) {
        if !self.cases.begin_edit(self.cursor) {
            return;
        }
        if let Some(draft) = self.cases.draft() {
            for (input, field) in self.edit_inputs.iter_mut().zip(TestCaseField::ALL) {
                input.set_value(field.get(draft));
            }
        }
        self.edit_field = 0;
    }

    fn next_provider(&mut self) {
        let position = self.providers.iter().position(|p| *p == self.provider);
        let next = position.map_or(0, |i| (i + 1) % self.providers.len());
        if let Some(provider) = self.providers.get(next) {
            self.provider = *provider;
        }
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5)])
            .split(area);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(20)])
            .split(rows[0]);

        let editing = self.cases.editing_index().is_some();
        self.key_input.render_with_label(
            frame,
            top[0],
            "Issue key",
            self.focus == Focus::KeyInput && !editing,
        );
        self.render_options(frame, top[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);

        match (&self.issue_key, &self.issue) {
            (Some(key), Some(issue)) => render_issue(frame, body[0], key, issue),
            _ => {
                let hint = if self.pending.is_pending(Operation::Lookup) {
                    "Loading issue..."
                } else {
                    "Enter an issue key and press Enter."
                };
                frame.render_widget(
                    Paragraph::new(hint)
                        .style(Style::default().fg(theme().muted))
                        .block(Block::default().borders(Borders::ALL).title(" Issue ")),
                    body[0],
                );
            }
        }

        if editing {
            self.render_editor(frame, body[1]);
        } else {
            self.render_list(frame, body[1]);
        }
    }

    fn render_options(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let line = Line::from(vec![
            Span::styled(" Test type: ", Style::default().fg(t.muted)),
            Span::styled(self.test_type.label(), t.title()),
            Span::styled("   AI: ", Style::default().fg(t.muted)),
            Span::styled(self.provider.name(), t.title()),
            Span::styled(
                if self.pending.is_pending(Operation::Providers) {
                    "  (reloading)"
                } else {
                    ""
                },
                Style::default().fg(t.muted),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let title = format!(
            " Test cases ({} selected of {}) ",
            self.cases.selected_count(),
            self.cases.len()
        );
        let block = Block::default()
            .title(Span::styled(title, t.title()))
            .borders(Borders::ALL)
            .border_style(t.border(self.focus == Focus::List));

        if self.spinner.is_spinning() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            self.spinner.render(frame, inner);
            return;
        }

        if self.cases.is_empty() {
            frame.render_widget(
                Paragraph::new("No test cases yet. Look up an issue and press 'g' to generate.")
                    .style(Style::default().fg(t.muted))
                    .wrap(Wrap { trim: true })
                    .block(block),
                area,
            );
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(8)])
            .split(area);

        let items: Vec<ListItem> = self
            .cases
            .items()
            .iter()
            .map(|entry| {
                let (mark, style) = if entry.selected {
                    ("[x] ", Style::default().fg(t.selected))
                } else {
                    ("[ ] ", Style::default())
                };
                ListItem::new(Line::from(vec![
                    Span::styled(mark, style),
                    Span::raw(entry.item.title.clone()),
                ]))
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(self.cursor));
        frame.render_stateful_widget(
            List::new(items).block(block).highlight_style(t.cursor_row()),
            chunks[0],
            &mut state,
        );

        if let Some(entry) = self.cases.items().get(self.cursor) {
            let label = Style::default().fg(t.muted).add_modifier(Modifier::BOLD);
            let preview = vec![
                Line::styled("Steps", label),
                Line::raw(entry.item.description.clone()),
                Line::styled("Expected result", label),
                Line::raw(entry.item.result.clone()),
            ];
            frame.render_widget(
                Paragraph::new(preview)
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL).border_style(t.border(false))),
                chunks[1],
            );
        }
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let block = Block::default()
            .title(Span::styled(" Edit test case ", t.title()))
            .borders(Borders::ALL)
            .border_style(t.border(true));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(inner);

        for (i, (input, field)) in self.edit_inputs.iter().zip(TestCaseField::ALL).enumerate() {
            input.render_with_label(frame, chunks[i], field.label(), i == self.edit_field);
        }

        let status = if self.cases.can_save() {
            Span::styled("Enter to save, Esc to cancel", Style::default().fg(t.muted))
        } else {
            Span::styled("All fields are required", Style::default().fg(t.warning))
        };
        frame.render_widget(Paragraph::new(Line::from(status)), chunks[3]);
    }
}
