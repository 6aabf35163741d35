//! User interface components and views.
//!
//! This module contains all TUI rendering logic, including views for the
//! login, test case and task screens and the reusable components they share.

mod components;
pub mod theme;
mod views;

pub use components::{render_context_help, Banners, ErrorDialog};
pub use views::{
    LoginAction, LoginView, Operation, SettingsAction, SettingsView, TaskAction, TaskGeneratorView,
    TestCaseAction, TestCaseView,
};
