//! Centralized error types for jiragen.
//!
//! Every layer has its own `thiserror` enum; [`AppError`] gathers them so the
//! screens can show one kind of error, rendered through
//! [`AppError::user_message`].

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::editor::SelectionError;
use crate::session::SessionError;
use crate::validation::{IssueKeyError, UploadError};

/// Any failure a screen can report.
#[derive(Debug, Error)]
pub enum AppError {
    /// Config file problems.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Backend calls.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Token storage errors.
    #[error("{0}")]
    Session(#[from] SessionError),

    /// Issue or project key validation.
    #[error("{0}")]
    IssueKey(#[from] IssueKeyError),

    /// Upload document validation.
    #[error("{0}")]
    Upload(#[from] UploadError),

    /// Submission selection rules.
    #[error("{0}")]
    Selection(#[from] SelectionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// The text shown in the banner or dialog.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                _ => "Could not read or save configuration. Check file permissions.".to_string(),
            },
            AppError::Api(e) => match e {
                ApiError::MissingToken => {
                    "You are not signed in. Please log in again.".to_string()
                }
                ApiError::Server { .. } if e.is_unauthorized() => {
                    "Your session was rejected. Please log in again.".to_string()
                }
                ApiError::Server { message, .. } => message.clone(),
                ApiError::Network(_) => {
                    "Connection failed. Please check the backend URL and your network.".to_string()
                }
                ApiError::InvalidResponse(_) => {
                    "Unexpected response from the backend. Please try again.".to_string()
                }
                ApiError::InvalidUrl(msg) => format!("Invalid backend URL: {}", msg),
                ApiError::EmptyPayload(what) => format!("Nothing to send: {}.", what),
                ApiError::File(_) => "Could not read the selected file.".to_string(),
            },
            AppError::Session(_) => {
                "Could not access secure storage for your session.".to_string()
            }
            AppError::IssueKey(e) => e.to_string(),
            AppError::Upload(e) => e.to_string(),
            AppError::Selection(e) => e.to_string(),
            AppError::Io(_) => "A file operation failed. Please check file permissions.".to_string(),
        }
    }

    /// Whether the user must sign in again to continue.
    pub fn requires_login(&self) -> bool {
        match self {
            AppError::Api(ApiError::MissingToken) => true,
            AppError::Api(e) => e.is_unauthorized(),
            _ => false,
        }
    }

    /// Errors the user has to acknowledge: the session or configuration
    /// could not be stored, so the next run will not behave like this one.
    pub fn is_critical(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Session(_))
    }

    /// A hint on how to recover, shown under critical errors.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::ParseError(_))
            | AppError::Config(ConfigError::ValidationError(_)) => {
                Some("Fix the file shown by 'jiragen config-path' or delete it to use defaults.")
            }
            AppError::Session(_) => Some("Check that the system keyring is unlocked."),
            AppError::Api(ApiError::Network(_)) | AppError::Api(ApiError::InvalidUrl(_)) => {
                Some("Check 'backend_url' in your configuration or pass --backend-url.")
            }
            _ if self.requires_login() => Some("Run 'jiragen login --google-token <TOKEN>'."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_app_error_from_api_error() {
        let app_err: AppError = ApiError::MissingToken.into();
        assert!(matches!(app_err, AppError::Api(ApiError::MissingToken)));
    }

    #[test]
    fn test_server_message_is_shown_verbatim() {
        let err = AppError::Api(ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Issue not found"}"#,
        ));
        assert_eq!(err.user_message(), "Issue not found");
        assert!(!err.requires_login());
    }

    #[test]
    fn test_unauthorized_requires_login() {
        let err = AppError::Api(ApiError::from_response(StatusCode::UNAUTHORIZED, ""));
        assert!(err.requires_login());
        assert!(err.user_message().contains("log in"));
        assert!(err.suggested_action().unwrap().contains("login"));
    }

    #[test]
    fn test_missing_token_requires_login() {
        let err = AppError::Api(ApiError::MissingToken);
        assert!(err.requires_login());
    }

    #[test]
    fn test_selection_messages_are_distinct() {
        let none = AppError::from(SelectionError::NoGroupsSelected).user_message();
        let empty = AppError::from(SelectionError::EmptyGroupSelection {
            group: "Auth".into(),
        })
        .user_message();
        assert_ne!(none, empty);
        assert!(empty.contains("Auth"));
    }

    #[test]
    fn test_storage_errors_are_critical() {
        assert!(AppError::Config(ConfigError::NoConfigDir).is_critical());
        assert!(!AppError::Api(ApiError::MissingToken).is_critical());

        let err = AppError::from(SessionError::Keyring("locked".into()));
        assert!(err.is_critical());
        assert!(err.suggested_action().unwrap().contains("keyring"));
    }
}
