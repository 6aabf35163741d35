//! Editable lists of generated artifacts.
//!
//! Generated test cases and task groups are held in editors that add a
//! transient selection flag to every item and allow one item at a time to be
//! edited through a draft. The selection flag never reaches the payload built
//! for submission.

mod task_groups;
mod test_cases;

use thiserror::Error;

pub use task_groups::{TaskDraft, TaskField, TaskGroupList, TaskLocation};
pub use test_cases::{TestCaseField, TestCaseList};

/// An item with a transient selection flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selectable<T> {
    pub item: T,
    pub selected: bool,
}

impl<T> Selectable<T> {
    /// Wrap an item, unselected.
    pub fn new(item: T) -> Self {
        Self {
            item,
            selected: false,
        }
    }

    /// Flip the selection flag and return the new value.
    pub fn toggle(&mut self) -> bool {
        self.selected = !self.selected;
        self.selected
    }
}

/// Viewing or editing one element of a list.
///
/// `L` locates the element being edited and `D` is the buffered draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState<L, D> {
    Viewing,
    Editing { at: L, draft: D },
}

impl<L, D> Default for EditState<L, D> {
    fn default() -> Self {
        EditState::Viewing
    }
}

impl<L, D> EditState<L, D> {
    /// Whether an edit is open.
    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing { .. })
    }

    /// Location of the open edit.
    pub fn location(&self) -> Option<&L> {
        match self {
            EditState::Editing { at, .. } => Some(at),
            EditState::Viewing => None,
        }
    }

    /// The draft of the open edit.
    pub fn draft(&self) -> Option<&D> {
        match self {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Viewing => None,
        }
    }

    /// Mutable access to the draft of the open edit.
    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Viewing => None,
        }
    }

    /// Close the edit, returning its location and draft.
    pub fn take(&mut self) -> Option<(L, D)> {
        match std::mem::replace(self, EditState::Viewing) {
            EditState::Editing { at, draft } => Some((at, draft)),
            EditState::Viewing => None,
        }
    }
}

/// Submission-time selection problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Select at least one test case.")]
    NoTestCasesSelected,
    #[error("Select at least one epic.")]
    NoGroupsSelected,
    #[error("Select at least one task in epic '{group}'.")]
    EmptyGroupSelection {
        /// Title of the first offending group.
        group: String,
    },
}

/// Truncate `value` to at most `max` characters.
pub(crate) fn clamp_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectable_double_toggle_is_identity() {
        let mut item = Selectable::new("a");
        assert!(item.toggle());
        assert!(!item.toggle());
        assert_eq!(item, Selectable::new("a"));
    }

    #[test]
    fn test_edit_state_take() {
        let mut state: EditState<usize, String> = EditState::Editing {
            at: 2,
            draft: "x".into(),
        };
        assert!(state.is_editing());
        assert_eq!(state.location(), Some(&2));
        assert_eq!(state.take(), Some((2, "x".to_string())));
        assert!(!state.is_editing());
        assert_eq!(state.take(), None);
    }

    #[test]
    fn test_clamp_chars_counts_characters() {
        assert_eq!(clamp_chars("ñandú", 3), "ñan");
        assert_eq!(clamp_chars("ab", 5), "ab");
    }
}
