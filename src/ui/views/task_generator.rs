//! Task generator screen.
//!
//! A requirements PDF is staged from a local path and uploaded; the backend
//! answers with epics (task groups) that can be selected, edited and sent to
//! a project of the issue tracker.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, info};

use super::{Operation, Pending};
use crate::api::types::{Priority, TaskGroup};
use crate::editor::{TaskDraft, TaskField, TaskGroupList, TaskLocation};
use crate::error::AppError;
use crate::events::KeyContext;
use crate::ui::components::{Spinner, TextInput};
use crate::ui::theme::theme;
use crate::validation::{validate_project_key, DocumentFile};

/// Task fields edited through text inputs, in form order.
const TASK_FIELDS: [TaskField; 3] = [TaskField::Title, TaskField::Description, TaskField::Environment];

/// Position of the priority selector in the task edit form.
const PRIORITY_SLOT: usize = TASK_FIELDS.len();

/// Requests from the task screen to the application.
#[derive(Debug)]
pub enum TaskAction {
    /// Upload the staged document.
    Upload(DocumentFile),
    /// Send the selected groups to a project.
    Submit {
        project_key: String,
        groups: Vec<TaskGroup>,
    },
    /// The input was rejected before reaching the backend.
    Rejected(AppError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Path,
    ProjectKey,
    List,
}

/// A visible row of the group list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Group(usize),
    Task(usize, usize),
}

/// The task generator screen.
pub struct TaskGeneratorView {
    path_input: TextInput,
    staged: Option<DocumentFile>,
    /// Inline message of the uploader.
    upload_error: Option<String>,
    project_input: TextInput,
    groups: TaskGroupList,
    cursor: usize,
    focus: Focus,
    group_title_input: TextInput,
    task_inputs: [TextInput; 3],
    edit_slot: usize,
    pending: Pending,
    spinner: Spinner,
}

impl TaskGeneratorView {
    pub fn new(default_project_key: Option<&str>) -> Self {
        let mut project_input = TextInput::new().with_max_len(4).with_placeholder("PIA");
        if let Some(key) = default_project_key {
            project_input.set_value(key);
        }
        Self {
            path_input: TextInput::new().with_placeholder("/path/to/requirements.pdf"),
            staged: None,
            upload_error: None,
            project_input,
            groups: TaskGroupList::default(),
            cursor: 0,
            focus: Focus::Path,
            group_title_input: TextInput::new().with_max_len(TaskField::Title.max_len()),
            task_inputs: TASK_FIELDS.map(|f| TextInput::new().with_max_len(f.max_len())),
            edit_slot: 0,
            pending: Pending::default(),
            spinner: Spinner::default(),
        }
    }

    #[cfg(test)]
    pub fn staged(&self) -> Option<&DocumentFile> {
        self.staged.as_ref()
    }

    #[cfg(test)]
    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    #[cfg(test)]
    pub fn groups(&self) -> &TaskGroupList {
        &self.groups
    }

    /// Whether key presses are going to a text field.
    pub fn is_capturing_text(&self) -> bool {
        self.focus != Focus::List || self.groups.editing().is_some()
    }

    /// Key hints for the footer.
    pub fn context(&self) -> KeyContext {
        if self.groups.editing().is_some() {
            KeyContext::Editing
        } else {
            KeyContext::Tasks
        }
    }

    // ------------------------------------------------------------------------
    // Results from the backend
    // ------------------------------------------------------------------------

    /// Replace the groups with a generation result and drop the staged file.
    pub fn set_task_groups(&mut self, groups: Vec<TaskGroup>) {
        self.finish(Operation::Upload);
        info!(count = groups.len(), "Received task groups");
        self.groups = TaskGroupList::new(groups);
        self.cursor = 0;
        self.staged = None;
        self.path_input.clear();
        self.focus = Focus::List;
    }

    /// Mark an operation as resolved, whatever its outcome.
    pub fn finish(&mut self, op: Operation) {
        self.pending.finish(op);
        if op == Operation::Upload {
            self.spinner.stop();
        }
    }

    pub fn tick(&mut self) {
        self.spinner.tick();
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<TaskAction> {
        if self.groups.editing().is_some() {
            self.handle_edit_input(key);
            return None;
        }
        match self.focus {
            Focus::Path => {
                match key.code {
                    KeyCode::Enter => self.stage(),
                    KeyCode::Tab => self.focus = Focus::ProjectKey,
                    KeyCode::Esc => self.focus = Focus::List,
                    _ => {
                        self.path_input.handle_input(key);
                    }
                }
                None
            }
            Focus::ProjectKey => {
                match key.code {
                    KeyCode::Tab | KeyCode::Esc | KeyCode::Enter => self.focus = Focus::List,
                    KeyCode::BackTab => self.focus = Focus::Path,
                    _ => {
                        self.project_input.handle_input(key);
                    }
                }
                None
            }
            Focus::List => self.handle_list_input(key),
        }
    }

    fn handle_list_input(&mut self, key: KeyEvent) -> Option<TaskAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        let rows = self.rows();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.cursor + 1 < rows.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Char(' ') => match rows.get(self.cursor) {
                Some(Row::Group(g)) => {
                    self.groups.toggle_group(*g);
                }
                Some(Row::Task(g, t)) => {
                    self.groups.toggle_task(*g, *t);
                }
                None => {}
            },
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(row) = rows.get(self.cursor).copied() {
                    self.begin_edit(row);
                }
            }
            KeyCode::Char('u') => return self.upload(),
            KeyCode::Char('x') => self.remove_staged(),
            KeyCode::Char('s') => return self.submit(),
            KeyCode::Char('/') | KeyCode::Tab => self.focus = Focus::Path,
            KeyCode::BackTab => self.focus = Focus::ProjectKey,
            _ => {}
        }
        None
    }

    fn handle_edit_input(&mut self, key: KeyEvent) {
        let Some(location) = self.groups.editing() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.groups.cancel(),
            KeyCode::Enter => {
                self.groups.save();
            }
            _ => match location {
                TaskLocation::Group(_) => {
                    if self.group_title_input.handle_input(key) {
                        let value = self.group_title_input.value().to_string();
                        self.groups.set_group_title(&value);
                    }
                }
                TaskLocation::Task(..) => self.handle_task_edit_key(key),
            },
        }
    }

    fn handle_task_edit_key(&mut self, key: KeyEvent) {
        let slots = PRIORITY_SLOT + 1;
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.edit_slot = (self.edit_slot + 1) % slots,
            KeyCode::BackTab | KeyCode::Up => self.edit_slot = (self.edit_slot + slots - 1) % slots,
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if self.edit_slot == PRIORITY_SLOT => {
                if let Some(TaskDraft::Task(task)) = self.groups.draft() {
                    let priority = if key.code == KeyCode::Left {
                        task.priority.prev()
                    } else {
                        task.priority.next()
                    };
                    self.groups.set_task_priority(priority);
                }
            }
            _ if self.edit_slot < PRIORITY_SLOT => {
                let input = &mut self.task_inputs[self.edit_slot];
                if input.handle_input(key) {
                    let value = input.value().to_string();
                    self.groups.set_task_field(TASK_FIELDS[self.edit_slot], &value);
                }
            }
            _ => {}
        }
    }

    fn begin_edit(&mut self, row: Row) {
        let opened = match row {
            Row::Group(g) => self.groups.begin_group_edit(g),
            Row::Task(g, t) => self.groups.begin_task_edit(g, t),
        };
        if !opened {
            return;
        }
        match self.groups.draft() {
            Some(TaskDraft::GroupTitle(title)) => self.group_title_input.set_value(title.as_str()),
            Some(TaskDraft::Task(task)) => {
                for (input, field) in self.task_inputs.iter_mut().zip(TASK_FIELDS) {
                    input.set_value(field.get(task));
                }
            }
            None => {}
        }
        self.edit_slot = 0;
    }

    /// Validate the path and stage the document.
    fn stage(&mut self) {
        if self.pending.is_pending(Operation::Upload) {
            return;
        }
        let path = self.path_input.value().trim();
        if path.is_empty() {
            return;
        }
        match DocumentFile::open(path) {
            Ok(document) => {
                debug!(file = %document.name, "Staged document");
                self.staged = Some(document);
                self.upload_error = None;
                self.focus = Focus::List;
            }
            Err(e) => {
                self.staged = None;
                self.upload_error = Some(e.to_string());
            }
        }
    }

    fn remove_staged(&mut self) {
        if self.pending.is_pending(Operation::Upload) {
            return;
        }
        self.staged = None;
        self.upload_error = None;
        self.path_input.clear();
    }

    fn upload(&mut self) -> Option<TaskAction> {
        let document = match &self.staged {
            Some(document) => document.clone(),
            None => {
                self.upload_error = Some("Choose a PDF file first.".to_string());
                return None;
            }
        };
        if !self.pending.start(Operation::Upload) {
            return None;
        }
        self.spinner.start("Uploading and processing the file...");
        Some(TaskAction::Upload(document))
    }

    fn submit(&mut self) -> Option<TaskAction> {
        let project_key = match validate_project_key(self.project_input.value().trim()) {
            Ok(key) => key.to_string(),
            Err(e) => return Some(TaskAction::Rejected(e.into())),
        };
        let groups = match self.groups.selected_payload() {
            Ok(groups) => groups,
            Err(e) => return Some(TaskAction::Rejected(e.into())),
        };
        if !self.pending.start(Operation::Submit) {
            return None;
        }
        Some(TaskAction::Submit {
            project_key,
            groups,
        })
    }

    fn rows(&self) -> Vec<Row> {
        self.groups
            .groups()
            .iter()
            .enumerate()
            .flat_map(|(g, entry)| {
                std::iter::once(Row::Group(g)).chain((0..entry.tasks.len()).map(move |t| Row::Task(g, t)))
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(5), Constraint::Min(5)])
            .split(area);

        let inputs = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(16)])
            .split(rows[0]);

        let editing = self.groups.editing().is_some();
        self.path_input
            .render_with_label(frame, inputs[0], "PDF file", self.focus == Focus::Path && !editing);
        self.project_input.render_with_label(
            frame,
            inputs[1],
            "Project",
            self.focus == Focus::ProjectKey && !editing,
        );

        self.render_uploader(frame, rows[1]);

        if editing {
            self.render_editor(frame, rows[2]);
        } else {
            self.render_groups(frame, rows[2]);
        }
    }

    fn render_uploader(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let (border, lines) = match (&self.staged, &self.upload_error) {
            (_, Some(error)) => (
                Style::default().fg(t.error),
                vec![Line::styled(error.clone(), Style::default().fg(t.error))],
            ),
            (Some(document), None) => {
                let action = if self.spinner.is_spinning() {
                    self.spinner.line()
                } else {
                    Line::styled("[u] upload   [x] remove", Style::default().fg(t.muted))
                };
                (
                    Style::default().fg(t.selected),
                    vec![
                        Line::from(vec![
                            Span::styled(
                                document.name.clone(),
                                Style::default().fg(t.selected).add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(
                                format!("  {}", document.size_label()),
                                Style::default().fg(t.muted),
                            ),
                        ]),
                        action,
                    ],
                )
            }
            (None, None) => (
                t.border(false),
                vec![
                    Line::raw("Type the path of a PDF and press Enter"),
                    Line::styled("Only PDF files (15MB max)", Style::default().fg(t.muted)),
                ],
            ),
        };

        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).border_style(border).title(" Upload ")),
            area,
        );
    }

    fn render_groups(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let title = format!(
            " Epics ({} selected of {}) ",
            self.groups.selected_group_count(),
            self.groups.len()
        );
        let block = Block::default()
            .title(Span::styled(title, t.title()))
            .borders(Borders::ALL)
            .border_style(t.border(self.focus == Focus::List));

        if self.groups.is_empty() {
            frame.render_widget(
                Paragraph::new("Upload a requirements document to generate epics and tasks.")
                    .style(Style::default().fg(t.muted))
                    .block(block),
                area,
            );
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(5)])
            .split(area);

        let groups = self.groups.groups();
        let rows = self.rows();
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| match *row {
                Row::Group(g) => {
                    let entry = &groups[g];
                    ListItem::new(Line::from(vec![
                        checkbox(entry.selected),
                        Span::styled(entry.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                        Span::styled(
                            format!("  ({}/{} tasks)", entry.selected_task_count(), entry.tasks.len()),
                            Style::default().fg(t.muted),
                        ),
                    ]))
                }
                Row::Task(g, i) => {
                    let task = &groups[g].tasks[i];
                    ListItem::new(Line::from(vec![
                        Span::raw("    "),
                        checkbox(task.selected),
                        Span::raw(task.item.title.clone()),
                        Span::raw("  "),
                        priority_badge(task.item.priority),
                        Span::styled(
                            format!("  {}", task.item.environment),
                            Style::default().fg(t.muted),
                        ),
                    ]))
                }
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(self.cursor.min(rows.len().saturating_sub(1))));
        frame.render_stateful_widget(
            List::new(items).block(block).highlight_style(t.cursor_row()),
            chunks[0],
            &mut state,
        );

        let description = match rows.get(self.cursor) {
            Some(Row::Task(g, i)) => groups[*g].tasks[*i].item.description.clone(),
            _ => String::new(),
        };
        frame.render_widget(
            Paragraph::new(description)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).border_style(t.border(false))),
            chunks[1],
        );
    }

    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let location = self.groups.editing();
        let heading = match location {
            Some(TaskLocation::Group(_)) => " Edit epic ",
            _ => " Edit task ",
        };
        let block = Block::default()
            .title(Span::styled(heading, t.title()))
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
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        match self.groups.draft() {
            Some(TaskDraft::GroupTitle(_)) => {
                self.group_title_input.render_with_label(frame, chunks[0], "Title", true);
            }
            Some(TaskDraft::Task(task)) => {
                for (i, (input, field)) in self.task_inputs.iter().zip(TASK_FIELDS).enumerate() {
                    input.render_with_label(frame, chunks[i], field.label(), self.edit_slot == i);
                }
                let marker = if self.edit_slot == PRIORITY_SLOT {
                    Style::default().fg(t.focus).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(t.muted)
                };
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::styled(" Priority: ◂ ", marker),
                        priority_badge(task.priority),
                        Span::styled(" ▸", marker),
                    ])),
                    chunks[3],
                );
            }
            None => {}
        }

        let status = if self.groups.can_save() {
            Span::styled("Enter to save, Esc to cancel", Style::default().fg(t.muted))
        } else {
            Span::styled("A title is required", Style::default().fg(t.warning))
        };
        frame.render_widget(Paragraph::new(Line::from(status)), chunks[4]);
    }
}

fn checkbox(selected: bool) -> Span<'static> {
    if selected {
        Span::styled("[x] ", Style::default().fg(theme().selected))
    } else {
        Span::raw("[ ] ")
    }
}

fn priority_badge(priority: Priority) -> Span<'static> {
    let color = match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    };
    Span::styled(format!("[{}]", priority), Style::default().fg(color))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::api::types::Task;
    use crate::editor::SelectionError;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(view: &mut TaskGeneratorView, s: &str) {
        for c in s.chars() {
            view.handle_input(key(KeyCode::Char(c)));
        }
    }

    fn task(title: &str) -> Task {
        Task {
            title: title.into(),
            description: "d".into(),
            priority: Priority::Medium,
            environment: "backend".into(),
        }
    }

    fn groups() -> Vec<TaskGroup> {
        vec![
            TaskGroup {
                title: "Auth".into(),
                tasks: vec![task("login"), task("logout")],
            },
            TaskGroup {
                title: "Billing".into(),
                tasks: vec![task("invoice")],
            },
        ]
    }

    fn pdf_file(size: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF-1.7\n").unwrap();
        file.write_all(&vec![0u8; size]).unwrap();
        file
    }

    fn view_with_groups() -> TaskGeneratorView {
        let mut view = TaskGeneratorView::new(Some("PIA"));
        view.set_task_groups(groups());
        view
    }

    #[test]
    fn test_stage_valid_pdf() {
        let file = pdf_file(1024);
        let mut view = TaskGeneratorView::new(None);
        type_str(&mut view, &file.path().display().to_string());
        view.handle_input(key(KeyCode::Enter));

        assert!(view.staged().is_some());
        assert!(view.upload_error().is_none());
    }

    #[test]
    fn test_stage_rejects_non_pdf() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"plain text").unwrap();
        let mut view = TaskGeneratorView::new(None);
        type_str(&mut view, &file.path().display().to_string());
        view.handle_input(key(KeyCode::Enter));

        assert!(view.staged().is_none());
        assert_eq!(view.upload_error(), Some("Only PDF files are allowed"));
    }

    #[test]
    fn test_upload_is_guarded_while_pending() {
        let file = pdf_file(16);
        let mut view = TaskGeneratorView::new(None);
        type_str(&mut view, &file.path().display().to_string());
        view.handle_input(key(KeyCode::Enter));

        assert!(matches!(
            view.handle_input(key(KeyCode::Char('u'))),
            Some(TaskAction::Upload(_))
        ));
        assert!(view.handle_input(key(KeyCode::Char('u'))).is_none());
        view.handle_input(key(KeyCode::Char('x')));
        assert!(view.staged().is_some());

        view.set_task_groups(groups());
        assert!(view.staged().is_none());
        assert_eq!(view.groups().len(), 2);
    }

    #[test]
    fn test_upload_without_file_shows_message() {
        let mut view = TaskGeneratorView::new(None);
        view.handle_input(key(KeyCode::Esc));
        assert!(view.handle_input(key(KeyCode::Char('u'))).is_none());
        assert!(view.upload_error().is_some());
    }

    #[test]
    fn test_remove_staged_file() {
        let file = pdf_file(16);
        let mut view = TaskGeneratorView::new(None);
        type_str(&mut view, &file.path().display().to_string());
        view.handle_input(key(KeyCode::Enter));
        view.handle_input(key(KeyCode::Char('x')));
        assert!(view.staged().is_none());
    }

    #[test]
    fn test_submit_with_no_groups_selected() {
        let mut view = view_with_groups();
        assert!(matches!(
            view.handle_input(key(KeyCode::Char('s'))),
            Some(TaskAction::Rejected(AppError::Selection(SelectionError::NoGroupsSelected)))
        ));
    }

    #[test]
    fn test_submit_with_empty_group_selection() {
        let mut view = view_with_groups();
        view.handle_input(key(KeyCode::Char(' ')));
        match view.handle_input(key(KeyCode::Char('s'))) {
            Some(TaskAction::Rejected(AppError::Selection(SelectionError::EmptyGroupSelection {
                group,
            }))) => assert_eq!(group, "Auth"),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_submit_selected_tasks() {
        let mut view = view_with_groups();
        view.handle_input(key(KeyCode::Down));
        view.handle_input(key(KeyCode::Char(' ')));

        match view.handle_input(key(KeyCode::Char('s'))) {
            Some(TaskAction::Submit {
                project_key,
                groups,
            }) => {
                assert_eq!(project_key, "PIA");
                assert_eq!(groups.len(), 1);
                assert_eq!(groups[0].tasks, vec![task("login")]);
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert!(view.handle_input(key(KeyCode::Char('s'))).is_none());
    }

    #[test]
    fn test_submit_requires_project_key() {
        let mut view = TaskGeneratorView::new(None);
        view.set_task_groups(groups());
        assert!(matches!(
            view.handle_input(key(KeyCode::Char('s'))),
            Some(TaskAction::Rejected(AppError::IssueKey(_)))
        ));
    }

    #[test]
    fn test_edit_task_priority_and_title() {
        let mut view = view_with_groups();
        view.handle_input(key(KeyCode::Down));
        view.handle_input(key(KeyCode::Char('e')));
        type_str(&mut view, "!");
        view.handle_input(key(KeyCode::BackTab));
        view.handle_input(key(KeyCode::Right));
        view.handle_input(key(KeyCode::Enter));

        let saved = &view.groups().groups()[0].tasks[0].item;
        assert_eq!(saved.title, "login!");
        assert_eq!(saved.priority, Priority::High);
    }

    #[test]
    fn test_edit_group_title_and_cancel() {
        let mut view = view_with_groups();
        view.handle_input(key(KeyCode::Char('e')));
        type_str(&mut view, " v2");
        view.handle_input(key(KeyCode::Esc));
        assert_eq!(view.groups().groups()[0].title, "Auth");

        view.handle_input(key(KeyCode::Char('e')));
        type_str(&mut view, " v2");
        view.handle_input(key(KeyCode::Enter));
        assert_eq!(view.groups().groups()[0].title, "Auth v2");
    }

    #[test]
    fn test_rows_flatten_groups_and_tasks() {
        let view = view_with_groups();
        assert_eq!(
            view.rows(),
            vec![Row::Group(0), Row::Task(0, 0), Row::Task(0, 1), Row::Group(1), Row::Task(1, 0)]
        );
    }
}
