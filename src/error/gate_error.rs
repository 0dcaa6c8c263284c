//! Unified error type for gate operations.

use thiserror::Error;

use crate::traits::{ArtifactError, HttpError, RenderError, StorageError};

/// Error returned by credential, occupancy and gate operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    /// Caller supplied something unusable (empty identity, bad ttl, ...).
    #[error("Invalid input: {0}")]
    ValidationInput(String),

    /// The requested record or artifact does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence or artifact storage failed; the operation was aborted.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Alarm signal delivery failed. Only ever logged.
    #[error("Notification failure: {0}")]
    Notify(String),
}

impl GateError {
    /// Short, stable code for logs and HTTP bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            GateError::ValidationInput(_) => "invalid_input",
            GateError::NotFound(_) => "not_found",
            GateError::Storage(_) => "storage_failure",
            GateError::Notify(_) => "notify_failure",
        }
    }

    /// Whether the caller can fix this by changing the request.
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, GateError::ValidationInput(_) | GateError::NotFound(_))
    }
}

impl From<StorageError> for GateError {
    fn from(err: StorageError) -> Self {
        GateError::Storage(err.to_string())
    }
}

impl From<ArtifactError> for GateError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound(identity) => {
                GateError::NotFound(format!("no artifact for '{}'", identity))
            }
            other => GateError::Storage(other.to_string()),
        }
    }
}

impl From<RenderError> for GateError {
    fn from(err: RenderError) -> Self {
        GateError::Storage(err.to_string())
    }
}

impl From<HttpError> for GateError {
    fn from(err: HttpError) -> Self {
        GateError::Notify(err.to_string())
    }
}
