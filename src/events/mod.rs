//! Event handling for the application.
//!
//! Terminal input is polled by [`EventHandler`] and converted into [`Event`]s
//! that drive `App::update`. Results of background API calls arrive on a
//! separate channel (see [`crate::tasks`]).

mod handler;
mod keys;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;
pub use keys::{keybindings, KeyContext};

/// An input event for the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// The tick interval elapsed without input.
    Tick,
    /// The application was asked to quit.
    Quit,
}
