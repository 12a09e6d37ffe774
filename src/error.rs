//! Error types for org-roster.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for roster operations.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No GitHub token found; set GITHUB_TOKEN or pass --token")]
    MissingToken,

    #[error("GitHub token cannot be used in a request header")]
    InvalidToken,

    #[error("GitHub rejected the token: {message}")]
    Unauthorized { message: String },

    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Export file {path} is invalid: {message}")]
    Export { path: PathBuf, message: String },
}

impl RosterError {
    /// Whether this is a credential precondition failure, raised before any
    /// directory call is attempted.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            RosterError::MissingToken | RosterError::InvalidToken | RosterError::Unauthorized { .. }
        )
    }

    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            RosterError::Api { status, .. } => Some(*status),
            RosterError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }
}

/// A specialized Result type for roster operations.
pub type Result<T> = std::result::Result<T, RosterError>;
