//! Task-group editor.
//!
//! Two selection levels: groups and their tasks. Toggling a group flips only
//! that group. Toggling a task recomputes its group's flag as the OR of the
//! group's task flags, so deselecting the last task deselects the group and
//! selecting any task reselects it.

use tracing::debug;

use super::{clamp_chars, EditState, Selectable, SelectionError};
use crate::api::types::{Priority, Task, TaskGroup};

/// Maximum characters in a task or group title.
const TITLE_MAX: usize = 200;

/// Maximum characters in a task description.
const DESCRIPTION_MAX: usize = 1000;

/// Maximum characters in a task environment.
const ENVIRONMENT_MAX: usize = 100;

/// A generated group with its selection flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupEntry {
    pub title: String,
    pub selected: bool,
    pub tasks: Vec<Selectable<Task>>,
}

impl GroupEntry {
    fn from_group(group: TaskGroup) -> Self {
        Self {
            title: group.title,
            selected: false,
            tasks: group.tasks.into_iter().map(Selectable::new).collect(),
        }
    }

    /// Whether any task in this group is selected.
    pub fn any_task_selected(&self) -> bool {
        self.tasks.iter().any(|t| t.selected)
    }

    /// Number of selected tasks.
    pub fn selected_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.selected).count()
    }
}

/// What is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskLocation {
    /// The title of a group.
    Group(usize),
    /// A task, by group and task index.
    Task(usize, usize),
}

/// Buffered edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDraft {
    GroupTitle(String),
    Task(Task),
}

/// An editable text field of a task draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Environment,
}

impl TaskField {
    /// Maximum number of characters accepted.
    pub fn max_len(&self) -> usize {
        match self {
            TaskField::Title => TITLE_MAX,
            TaskField::Description => DESCRIPTION_MAX,
            TaskField::Environment => ENVIRONMENT_MAX,
        }
    }

    /// Form label.
    pub fn label(&self) -> &'static str {
        match self {
            TaskField::Title => "Title",
            TaskField::Description => "Description",
            TaskField::Environment => "Environment",
        }
    }

    /// Read this field from a task.
    pub fn get<'a>(&self, task: &'a Task) -> &'a str {
        match self {
            TaskField::Title => &task.title,
            TaskField::Description => &task.description,
            TaskField::Environment => &task.environment,
        }
    }

    fn slot<'a>(&self, task: &'a mut Task) -> &'a mut String {
        match self {
            TaskField::Title => &mut task.title,
            TaskField::Description => &mut task.description,
            TaskField::Environment => &mut task.environment,
        }
    }
}

/// Generated task groups with two-level selection and single-item editing.
#[derive(Debug, Clone, Default)]
pub struct TaskGroupList {
    groups: Vec<GroupEntry>,
    edit: EditState<TaskLocation, TaskDraft>,
}

impl TaskGroupList {
    /// Wrap freshly generated groups, nothing selected.
    pub fn new(groups: Vec<TaskGroup>) -> Self {
        Self {
            groups: groups.into_iter().map(GroupEntry::from_group).collect(),
            edit: EditState::Viewing,
        }
    }

    pub fn groups(&self) -> &[GroupEntry] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Number of selected groups.
    pub fn selected_group_count(&self) -> usize {
        self.groups.iter().filter(|g| g.selected).count()
    }

    /// Flip one group's flag without touching its tasks.
    pub fn toggle_group(&mut self, group: usize) -> Option<bool> {
        let entry = self.groups.get_mut(group)?;
        entry.selected = !entry.selected;
        Some(entry.selected)
    }

    /// Flip one task's flag and recompute its group's flag.
    ///
    /// Returns the task's new flag.
    pub fn toggle_task(&mut self, group: usize, task: usize) -> Option<bool> {
        let entry = self.groups.get_mut(group)?;
        let selected = entry.tasks.get_mut(task)?.toggle();
        entry.selected = entry.any_task_selected();
        Some(selected)
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    /// Open an edit on a group title.
    pub fn begin_group_edit(&mut self, group: usize) -> bool {
        if self.edit.is_editing() {
            return false;
        }
        let Some(entry) = self.groups.get(group) else {
            return false;
        };
        debug!(group, "Editing group title");
        self.edit = EditState::Editing {
            at: TaskLocation::Group(group),
            draft: TaskDraft::GroupTitle(entry.title.clone()),
        };
        true
    }

    /// Open an edit on a task.
    pub fn begin_task_edit(&mut self, group: usize, task: usize) -> bool {
        if self.edit.is_editing() {
            return false;
        }
        let Some(entry) = self.groups.get(group).and_then(|g| g.tasks.get(task)) else {
            return false;
        };
        debug!(group, task, "Editing task");
        self.edit = EditState::Editing {
            at: TaskLocation::Task(group, task),
            draft: TaskDraft::Task(entry.item.clone()),
        };
        true
    }

    /// Location of the open edit.
    pub fn editing(&self) -> Option<TaskLocation> {
        self.edit.location().copied()
    }

    /// The open draft.
    pub fn draft(&self) -> Option<&TaskDraft> {
        self.edit.draft()
    }

    /// Replace the group title draft.
    pub fn set_group_title(&mut self, value: &str) {
        if let Some(TaskDraft::GroupTitle(title)) = self.edit.draft_mut() {
            *title = clamp_chars(value, TITLE_MAX);
        }
    }

    /// Replace a text field of the task draft.
    pub fn set_task_field(&mut self, field: TaskField, value: &str) {
        if let Some(TaskDraft::Task(task)) = self.edit.draft_mut() {
            *field.slot(task) = clamp_chars(value, field.max_len());
        }
    }

    /// Set the priority of the task draft.
    pub fn set_task_priority(&mut self, priority: Priority) {
        if let Some(TaskDraft::Task(task)) = self.edit.draft_mut() {
            task.priority = priority;
        }
    }

    /// Whether the draft may be saved: titles must not be blank.
    pub fn can_save(&self) -> bool {
        match self.edit.draft() {
            Some(TaskDraft::GroupTitle(title)) => !title.trim().is_empty(),
            Some(TaskDraft::Task(task)) => !task.title.trim().is_empty(),
            None => false,
        }
    }

    /// Commit the draft at its original location, keeping selection flags.
    pub fn save(&mut self) -> bool {
        if !self.can_save() {
            return false;
        }
        let Some((at, draft)) = self.edit.take() else {
            return false;
        };

        match (at, draft) {
            (TaskLocation::Group(g), TaskDraft::GroupTitle(title)) => {
                match self.groups.get_mut(g) {
                    Some(entry) => {
                        entry.title = title;
                        true
                    }
                    None => false,
                }
            }
            (TaskLocation::Task(g, t), TaskDraft::Task(task)) => {
                match self.groups.get_mut(g).and_then(|e| e.tasks.get_mut(t)) {
                    Some(entry) => {
                        entry.item = task;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Discard the draft.
    pub fn cancel(&mut self) {
        self.edit = EditState::Viewing;
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Check the selection rules without building a payload.
    ///
    /// At least one group must be selected, and every selected group must
    /// have at least one selected task.
    pub fn validate_selection(&self) -> Result<(), SelectionError> {
        let mut selected = self.groups.iter().filter(|g| g.selected).peekable();
        if selected.peek().is_none() {
            return Err(SelectionError::NoGroupsSelected);
        }
        if let Some(empty) = selected.find(|g| !g.any_task_selected()) {
            return Err(SelectionError::EmptyGroupSelection {
                group: empty.title.clone(),
            });
        }
        Ok(())
    }

    /// Build the submission payload: selected groups with only their
    /// selected tasks.
    pub fn selected_payload(&self) -> Result<Vec<TaskGroup>, SelectionError> {
        self.validate_selection()?;

        Ok(self
            .groups
            .iter()
            .filter(|g| g.selected)
            .map(|g| TaskGroup {
                title: g.title.clone(),
                tasks: g
                    .tasks
                    .iter()
                    .filter(|t| t.selected)
                    .map(|t| t.item.clone())
                    .collect(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, priority: Priority) -> Task {
        Task {
            title: title.to_string(),
            description: format!("{} description", title),
            priority,
            environment: "backend".to_string(),
        }
    }

    fn sample() -> TaskGroupList {
        TaskGroupList::new(vec![
            TaskGroup {
                title: "Authentication".into(),
                tasks: vec![
                    task("Login endpoint", Priority::High),
                    task("Logout endpoint", Priority::Low),
                ],
            },
            TaskGroup {
                title: "Reporting".into(),
                tasks: vec![task("Export CSV", Priority::Medium)],
            },
        ])
    }

    #[test]
    fn test_group_flag_is_or_of_tasks_after_task_toggle() {
        let mut list = sample();

        list.toggle_task(0, 1);
        assert!(list.groups()[0].selected);

        list.toggle_task(0, 0);
        assert!(list.groups()[0].selected);

        list.toggle_task(0, 1);
        assert!(list.groups()[0].selected);

        list.toggle_task(0, 0);
        assert!(!list.groups()[0].selected);

        for g in list.groups() {
            assert_eq!(g.selected, g.any_task_selected());
        }
    }

    #[test]
    fn test_group_toggle_does_not_touch_tasks() {
        let mut list = sample();
        assert_eq!(list.toggle_group(1), Some(true));
        assert_eq!(list.groups()[1].selected_task_count(), 0);
    }

    #[test]
    fn test_no_groups_selected() {
        let list = sample();
        assert_eq!(
            list.selected_payload(),
            Err(SelectionError::NoGroupsSelected)
        );
    }

    #[test]
    fn test_selected_group_without_tasks_is_mismatch_error() {
        let mut list = sample();
        list.toggle_task(0, 0);
        list.toggle_group(1);

        assert_eq!(
            list.selected_payload(),
            Err(SelectionError::EmptyGroupSelection {
                group: "Reporting".into()
            })
        );
    }

    #[test]
    fn test_payload_keeps_only_selected_tasks() {
        let mut list = sample();
        list.toggle_task(0, 1);
        list.toggle_task(1, 0);

        let payload = list.selected_payload().unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0].tasks, vec![task("Logout endpoint", Priority::Low)]);
        assert_eq!(payload[1].tasks.len(), 1);

        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("selected"));
    }

    #[test]
    fn test_unselected_group_tasks_are_excluded() {
        let mut list = sample();
        list.toggle_task(0, 0);
        list.toggle_task(1, 0);
        list.toggle_group(1);

        let payload = list.selected_payload().unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].title, "Authentication");
    }

    #[test]
    fn test_task_edit_save_and_cancel() {
        let mut list = sample();
        let original = list.groups()[0].tasks[1].item.clone();

        assert!(list.begin_task_edit(0, 1));
        list.set_task_field(TaskField::Environment, "frontend");
        list.cancel();
        assert_eq!(list.groups()[0].tasks[1].item, original);

        assert!(list.begin_task_edit(0, 1));
        list.set_task_priority(Priority::High);
        list.set_task_field(TaskField::Description, "Clear the session");
        assert!(list.save());

        let edited = &list.groups()[0].tasks[1].item;
        assert_eq!(edited.priority, Priority::High);
        assert_eq!(edited.description, "Clear the session");
        assert_eq!(list.groups()[0].tasks[0].item, task("Login endpoint", Priority::High));
    }

    #[test]
    fn test_group_title_edit() {
        let mut list = sample();
        assert!(list.begin_group_edit(1));
        assert!(!list.begin_task_edit(0, 0));
        list.set_group_title("Exports");
        assert!(list.save());
        assert_eq!(list.groups()[1].title, "Exports");
        assert!(list.editing().is_none());
    }

    #[test]
    fn test_blank_group_title_cannot_be_saved() {
        let mut list = sample();
        list.begin_group_edit(0);
        list.set_group_title("  ");
        assert!(!list.save());
        assert_eq!(list.editing(), Some(TaskLocation::Group(0)));
    }

    #[test]
    fn test_out_of_range() {
        let mut list = sample();
        assert_eq!(list.toggle_task(5, 0), None);
        assert_eq!(list.toggle_task(0, 9), None);
        assert!(!list.begin_task_edit(1, 3));
    }
}
