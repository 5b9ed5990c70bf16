//! Result type shared by every action.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::backend::BackendError;

/// Coarse failure category callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The requested record does not exist.
    NotFound,
    /// Retrying the same call may succeed.
    Transient,
    /// Retrying will not help.
    Fatal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Transient => write!(f, "transient"),
            ErrorKind::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("Transient backend failure: {0}")]
    Transient(#[source] BackendError),

    #[error("Backend failure: {0}")]
    Fatal(#[source] BackendError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Query failed after {attempts} attempt(s)")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last_error: Option<BackendError>,
    },
}

pub type ActionResult<T> = std::result::Result<T, ActionError>;

impl ActionError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::NotFound { .. } => ErrorKind::NotFound,
            ActionError::Transient(_) => ErrorKind::Transient,
            ActionError::Fatal(_) | ActionError::InvalidInput(_) => ErrorKind::Fatal,
            ActionError::RetriesExhausted { last_error, .. } => match last_error {
                Some(e) if !e.is_transient() => ErrorKind::Fatal,
                _ => ErrorKind::Transient,
            },
        }
    }

    /// Classifies a backend failure; `what` names the record for 404s.
    pub fn from_backend(what: impl Into<String>, err: BackendError) -> Self {
        if err.is_not_found() {
            Self::not_found(what)
        } else if err.is_transient() {
            Self::Transient(err)
        } else {
            Self::Fatal(err)
        }
    }
}
