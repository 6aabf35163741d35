//! Bearer session handling.
//!
//! The session holds the access and refresh tokens obtained at login. It is an
//! explicit value owned by the application and handed to the API client, and
//! it is persisted between runs in the OS keyring.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::types::LoginResponse;

/// The keyring service name for jiragen tokens.
const KEYRING_SERVICE: &str = "jiragen";

/// Keyring entry holding the access token.
const ACCESS_ENTRY: &str = "access-token";

/// Keyring entry holding the refresh token.
const REFRESH_ENTRY: &str = "refresh-token";

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The keyring could not be read or written.
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Result type for session storage.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Tokens for an authenticated user.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
    refresh_token: String,
}

impl Session {
    /// Create a session from raw tokens.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// The bearer token, or `None` if it is blank.
    pub fn access_token(&self) -> Option<&str> {
        let token = self.access_token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    /// The refresh token as returned at login.
    #[cfg(test)]
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Whether this session can authenticate requests.
    pub fn is_valid(&self) -> bool {
        self.access_token().is_some()
    }

    /// Load the stored session, if any.
    ///
    /// A missing entry is not an error; it yields `Ok(None)`.
    pub fn load() -> Result<Option<Self>> {
        let access = match read_entry(ACCESS_ENTRY)? {
            Some(token) => token,
            None => {
                debug!("No stored session");
                return Ok(None);
            }
        };
        let refresh = read_entry(REFRESH_ENTRY)?.unwrap_or_default();
        let session = Self::new(access, refresh);
        Ok(session.is_valid().then_some(session))
    }

    /// Persist this session.
    pub fn store(&self) -> Result<()> {
        write_entry(ACCESS_ENTRY, &self.access_token)?;
        write_entry(REFRESH_ENTRY, &self.refresh_token)?;
        debug!("Session stored");
        Ok(())
    }

    /// Remove any stored session.
    pub fn clear() -> Result<()> {
        for name in [ACCESS_ENTRY, REFRESH_ENTRY] {
            let entry = entry(name)?;
            match entry.delete_password() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    warn!(entry = name, "Failed to delete token: {}", e);
                    return Err(SessionError::Keyring(format!("failed to delete token: {}", e)));
                }
            }
        }
        Ok(())
    }

    /// Check whether a session is stored.
    pub fn exists() -> bool {
        matches!(Self::load(), Ok(Some(_)))
    }
}

impl From<LoginResponse> for Session {
    fn from(tokens: LoginResponse) -> Self {
        Self::new(tokens.access_token, tokens.refresh_token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}

fn entry(name: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(KEYRING_SERVICE, name)
        .map_err(|e| SessionError::Keyring(format!("failed to access keyring: {}", e)))
}

fn read_entry(name: &str) -> Result<Option<String>> {
    match entry(name)?.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(SessionError::Keyring(format!("failed to retrieve token: {}", e))),
    }
}

fn write_entry(name: &str, value: &str) -> Result<()> {
    entry(name)?
        .set_password(value)
        .map_err(|e| SessionError::Keyring(format!("failed to store token: {}", e)))
}
