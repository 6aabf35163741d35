//! Test-case editor.

use tracing::debug;

use super::{clamp_chars, EditState, Selectable, SelectionError};
use crate::api::types::TestCase;

/// An editable field of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestCaseField {
    Title,
    Description,
    Result,
}

impl TestCaseField {
    /// Fields in form order.
    pub const ALL: [TestCaseField; 3] = [
        TestCaseField::Title,
        TestCaseField::Description,
        TestCaseField::Result,
    ];

    /// Maximum number of characters accepted.
    pub fn max_len(&self) -> usize {
        match self {
            TestCaseField::Title => 200,
            TestCaseField::Description => 1000,
            TestCaseField::Result => 500,
        }
    }

    /// Form label.
    pub fn label(&self) -> &'static str {
        match self {
            TestCaseField::Title => "Title",
            TestCaseField::Description => "Description",
            TestCaseField::Result => "Expected result",
        }
    }

    /// Read this field from a test case.
    pub fn get<'a>(&self, case: &'a TestCase) -> &'a str {
        match self {
            TestCaseField::Title => &case.title,
            TestCaseField::Description => &case.description,
            TestCaseField::Result => &case.result,
        }
    }

    fn slot<'a>(&self, case: &'a mut TestCase) -> &'a mut String {
        match self {
            TestCaseField::Title => &mut case.title,
            TestCaseField::Description => &mut case.description,
            TestCaseField::Result => &mut case.result,
        }
    }
}

/// Generated test cases with selection and single-item editing.
#[derive(Debug, Clone, Default)]
pub struct TestCaseList {
    items: Vec<Selectable<TestCase>>,
    edit: EditState<usize, TestCase>,
}

impl TestCaseList {
    /// Wrap freshly generated test cases, none selected.
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self {
            items: cases.into_iter().map(Selectable::new).collect(),
            edit: EditState::Viewing,
        }
    }

    pub fn items(&self) -> &[Selectable<TestCase>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of selected test cases.
    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|i| i.selected).count()
    }

    /// Flip the selection of one test case.
    ///
    /// Returns the new flag, or `None` if the index is out of range.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        self.items.get_mut(index).map(Selectable::toggle)
    }

    /// Open an edit on one test case.
    ///
    /// Refused (returns `false`) when another edit is open or the index is
    /// out of range.
    pub fn begin_edit(&mut self, index: usize) -> bool {
        if self.edit.is_editing() {
            return false;
        }
        match self.items.get(index) {
            Some(entry) => {
                debug!(index, "Editing test case");
                self.edit = EditState::Editing {
                    at: index,
                    draft: entry.item.clone(),
                };
                true
            }
            None => false,
        }
    }

    /// Index of the test case being edited.
    pub fn editing_index(&self) -> Option<usize> {
        self.edit.location().copied()
    }

    /// The open draft.
    pub fn draft(&self) -> Option<&TestCase> {
        self.edit.draft()
    }

    /// Set a draft field, truncated to the field's limit.
    pub fn set_field(&mut self, field: TestCaseField, value: &str) {
        if let Some(draft) = self.edit.draft_mut() {
            *field.slot(draft) = clamp_chars(value, field.max_len());
        }
    }

    /// Whether the draft may be saved: every field has non-blank content.
    pub fn can_save(&self) -> bool {
        self.edit.draft().is_some_and(|d| {
            TestCaseField::ALL
                .iter()
                .all(|f| !f.get(d).trim().is_empty())
        })
    }

    /// Commit the draft at its original index, keeping the selection flag.
    pub fn save(&mut self) -> bool {
        if !self.can_save() {
            return false;
        }
        match self.edit.take() {
            Some((index, draft)) => match self.items.get_mut(index) {
                Some(entry) => {
                    entry.item = draft;
                    debug!(index, "Saved test case edit");
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Discard the draft.
    pub fn cancel(&mut self) {
        self.edit = EditState::Viewing;
    }

    /// Build the submission payload from the selected test cases.
    pub fn selected_payload(&self) -> Result<Vec<TestCase>, SelectionError> {
        let payload: Vec<TestCase> = self
            .items
            .iter()
            .filter(|i| i.selected)
            .map(|i| i.item.clone())
            .collect();

        if payload.is_empty() {
            return Err(SelectionError::NoTestCasesSelected);
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(n: usize) -> TestCase {
        TestCase {
            title: format!("Case {}", n),
            description: format!("Steps {}", n),
            result: format!("Result {}", n),
        }
    }

    fn list(n: usize) -> TestCaseList {
        TestCaseList::new((0..n).map(case).collect())
    }

    #[test]
    fn test_new_list_has_nothing_selected() {
        let list = list(3);
        assert_eq!(list.len(), 3);
        assert_eq!(list.selected_count(), 0);
        assert!(list.editing_index().is_none());
    }

    #[test]
    fn test_payload_contains_exactly_selected() {
        let mut list = list(5);
        list.toggle(0);
        list.toggle(2);
        list.toggle(4);

        let payload = list.selected_payload().unwrap();
        assert_eq!(payload, vec![case(0), case(2), case(4)]);

        let json = serde_json::to_value(&payload).unwrap();
        for item in json.as_array().unwrap() {
            assert!(item.get("selected").is_none());
        }
    }

    #[test]
    fn test_double_toggle_restores_selection() {
        let mut list = list(3);
        list.toggle(1);
        let before: Vec<bool> = list.items().iter().map(|i| i.selected).collect();

        list.toggle(2);
        list.toggle(2);

        let after: Vec<bool> = list.items().iter().map(|i| i.selected).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_toggle_out_of_range() {
        let mut list = list(1);
        assert_eq!(list.toggle(5), None);
    }

    #[test]
    fn test_no_selection_is_an_error() {
        let list = list(3);
        assert_eq!(
            list.selected_payload(),
            Err(SelectionError::NoTestCasesSelected)
        );
    }

    #[test]
    fn test_edit_then_cancel_leaves_item_unchanged() {
        let mut list = list(3);
        assert!(list.begin_edit(1));
        list.set_field(TestCaseField::Title, "Changed");
        list.cancel();

        assert_eq!(list.items()[1].item, case(1));
        assert!(list.editing_index().is_none());
    }

    #[test]
    fn test_edit_then_save_replaces_only_that_index() {
        let mut list = list(3);
        list.toggle(1);
        assert!(list.begin_edit(1));
        list.set_field(TestCaseField::Result, "New result");
        assert!(list.save());

        assert_eq!(list.items()[0].item, case(0));
        assert_eq!(list.items()[1].item.result, "New result");
        assert_eq!(list.items()[1].item.title, "Case 1");
        assert!(list.items()[1].selected);
        assert_eq!(list.items()[2].item, case(2));
    }

    #[test]
    fn test_only_one_edit_at_a_time() {
        let mut list = list(3);
        assert!(list.begin_edit(0));
        assert!(!list.begin_edit(2));
        assert_eq!(list.editing_index(), Some(0));
    }

    #[test]
    fn test_blank_field_blocks_save() {
        let mut list = list(2);
        list.begin_edit(0);
        list.set_field(TestCaseField::Description, "   ");
        assert!(!list.can_save());
        assert!(!list.save());
        assert_eq!(list.editing_index(), Some(0));
    }

    #[test]
    fn test_field_limits() {
        let mut list = list(1);
        list.begin_edit(0);
        list.set_field(TestCaseField::Title, &"x".repeat(300));
        assert_eq!(list.draft().unwrap().title.len(), 200);
    }
}
