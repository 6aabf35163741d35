//! Reusable UI components.

mod banner;
mod help_bar;
mod input;
mod modal;
mod spinner;

pub use banner::Banners;
pub use help_bar::render_context_help;
pub use input::TextInput;
pub use modal::{centered_rect, ErrorDialog};
pub use spinner::Spinner;
