//! API error types for the backend client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the generation backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No bearer token is available; raised before any request is sent.
    #[error("No access token available")]
    MissingToken,

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Server {
        /// HTTP status of the response.
        status: StatusCode,
        /// The `message` field of the error body, or a generic fallback.
        message: String,
    },

    /// Network or HTTP transport error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The success body did not match the expected shape.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The configured backend URL cannot be used.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Nothing to send.
    #[error("Nothing to send: {0}")]
    EmptyPayload(&'static str),

    /// Reading a local file for upload failed.
    #[error("Could not read file: {0}")]
    File(#[from] std::io::Error),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Shape of the backend's error bodies.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Build a server error from a status code and the raw response body.
    ///
    /// Uses the body's `message` field when present and non-empty, otherwise
    /// falls back to `"server error <status>"`.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("server error {}", status.as_u16()));

        ApiError::Server { status, message }
    }

    /// The HTTP status, if this error came from a server response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_uses_message_field() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Issue PIA-99 does not exist"}"#,
        );
        assert_eq!(err.to_string(), "Issue PIA-99 does not exist");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_from_response_fallback_on_missing_message() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"x"}"#);
        assert_eq!(err.to_string(), "server error 500");
    }

    #[test]
    fn test_from_response_fallback_on_non_json() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "server error 502");
    }

    #[test]
    fn test_from_response_fallback_on_blank_message() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, r#"{"message":"  "}"#);
        assert_eq!(err.to_string(), "server error 404");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ApiError::from_response(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(ApiError::from_response(StatusCode::FORBIDDEN, "").is_unauthorized());
        assert!(!ApiError::from_response(StatusCode::NOT_FOUND, "").is_unauthorized());
        assert!(!ApiError::MissingToken.is_unauthorized());
    }

    #[test]
    fn test_missing_token_display() {
        assert_eq!(ApiError::MissingToken.to_string(), "No access token available");
    }
}
