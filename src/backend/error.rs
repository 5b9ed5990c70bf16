//! Backend error types.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the directory and document database.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The service answered with a non-success status code.
    #[error("Server returned status {status}: {message}")]
    Status {
        status: u16,
        /// Machine-readable error type reported by the service, if any.
        kind: Option<String>,
        message: String,
    },

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// An identifier that cannot be used as a URL path segment.
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),
}

/// Error body returned by the backend, e.g.
/// `{"message": "...", "code": 409, "type": "user_already_exists"}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl BackendError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            kind: None,
            message: message.into(),
        }
    }

    /// Status code of the failed request, if the service answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Duplicate resource (e.g. an email that is already registered).
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(409)
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Failures that may succeed when the same request is sent again.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::Transport(_) => true,
            BackendError::Status { status, .. } => {
                matches!(*status, 408 | 429) || (500..600).contains(status)
            }
            BackendError::Decode(_) | BackendError::InvalidId(_) => false,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}
