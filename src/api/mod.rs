//! Generation backend client and types.
//!
//! This module provides the interface for communicating with the backend
//! proxy that fronts the AI providers and the issue tracker.

mod client;
pub mod error;
pub mod types;
mod user;

pub use client::BackendClient;
pub use error::ApiError;
pub use types::Issue;
