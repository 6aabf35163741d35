//! Key binding definitions.
//!
//! The bindings are fixed; this table only drives the hints shown in the
//! footer of each screen.

/// Where a binding applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Login,
    TestCases,
    Tasks,
    Editing,
    Settings,
    Global,
}

/// A single key binding description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keybinding {
    pub keys: &'static str,
    pub description: &'static str,
}

const fn bind(keys: &'static str, description: &'static str) -> Keybinding {
    Keybinding { keys, description }
}

const LOGIN: &[Keybinding] = &[
    bind("Enter", "sign in"),
    bind("Ctrl+R", "show/hide token"),
    bind("Esc", "quit"),
];

const TEST_CASES: &[Keybinding] = &[
    bind("/", "issue key"),
    bind("g", "generate"),
    bind("Space", "select"),
    bind("e", "edit"),
    bind("s", "send"),
    bind("t", "test type"),
    bind("p", "provider"),
    bind("r", "reload providers"),
];

const TASKS: &[Keybinding] = &[
    bind("/", "file"),
    bind("Tab", "next field"),
    bind("u", "upload"),
    bind("x", "remove file"),
    bind("Space", "select"),
    bind("e", "edit"),
    bind("s", "send"),
];

const EDITING: &[Keybinding] = &[
    bind("Tab", "next field"),
    bind("Enter", "save"),
    bind("Esc", "cancel"),
];

const SETTINGS: &[Keybinding] = &[
    bind("Tab", "next field"),
    bind("Space", "server type"),
    bind("Ctrl+R", "show/hide tokens"),
    bind("Enter", "save"),
    bind("Esc", "close"),
];

const GLOBAL: &[Keybinding] = &[
    bind("Ctrl+N", "switch generator"),
    bind("Ctrl+S", "settings"),
    bind("Ctrl+O", "log out"),
    bind("q", "quit"),
];

/// The bindings active in a context.
pub fn keybindings(context: KeyContext) -> &'static [Keybinding] {
    match context {
        KeyContext::Login => LOGIN,
        KeyContext::TestCases => TEST_CASES,
        KeyContext::Tasks => TASKS,
        KeyContext::Editing => EDITING,
        KeyContext::Settings => SETTINGS,
        KeyContext::Global => GLOBAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_context_has_bindings() {
        for context in [
            KeyContext::Login,
            KeyContext::TestCases,
            KeyContext::Tasks,
            KeyContext::Editing,
            KeyContext::Settings,
            KeyContext::Global,
        ] {
            assert!(!keybindings(context).is_empty());
        }
    }
}
