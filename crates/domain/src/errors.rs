//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for CrewConnect
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CrewConnectError {
    /// The backend host could not be reached.
    #[error("Cannot connect: {0}")]
    Connection(String),

    /// The authorization redirect was malformed, expired or rejected.
    #[error("Invalid authorization redirect: {0}")]
    InvalidRedirect(String),

    /// Input was rejected before any business logic ran.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Writing the config entry back to storage failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CrewConnectError {
    /// Form error code shown by the interactive setup flow, if this error is
    /// one the flow recovers from.
    pub fn form_error_code(&self) -> Option<&'static str> {
        match self {
            Self::Connection(_) => Some("cannot_connect"),
            Self::InvalidRedirect(_) => Some("invalid_auth_redirect"),
            _ => None,
        }
    }
}

/// Result type alias for CrewConnect operations
pub type Result<T> = std::result::Result<T, CrewConnectError>;
