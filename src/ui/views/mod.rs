//! Application views (screens).

mod detail;
mod login;
mod settings;
mod task_generator;
mod test_cases;

pub use login::{LoginAction, LoginView};
pub use settings::{SettingsAction, SettingsView};
pub use task_generator::{TaskAction, TaskGeneratorView};
pub use test_cases::{TestCaseAction, TestCaseView};

/// A backend operation a screen can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Lookup,
    Generate,
    Submit,
    Providers,
    Upload,
    LoadSettings,
    SaveSettings,
}

/// Operations currently awaiting a response.
///
/// A second trigger of an operation that is already pending is ignored.
#[derive(Debug, Clone, Default)]
pub struct Pending {
    ops: Vec<Operation>,
}

impl Pending {
    /// Mark an operation as started. Returns `false` if it already was.
    pub fn start(&mut self, op: Operation) -> bool {
        if self.ops.contains(&op) {
            return false;
        }
        self.ops.push(op);
        true
    }

    /// Mark an operation as resolved.
    pub fn finish(&mut self, op: Operation) {
        self.ops.retain(|o| *o != op);
    }

    pub fn is_pending(&self, op: Operation) -> bool {
        self.ops.contains(&op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_start_is_refused() {
        let mut pending = Pending::default();
        assert!(pending.start(Operation::Upload));
        assert!(!pending.start(Operation::Upload));
        assert!(pending.start(Operation::Submit));
    }

    #[test]
    fn test_finish_allows_restart() {
        let mut pending = Pending::default();
        pending.start(Operation::Generate);
        pending.finish(Operation::Generate);
        assert!(!pending.is_pending(Operation::Generate));
        assert!(pending.start(Operation::Generate));
    }
}
