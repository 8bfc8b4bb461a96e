use thiserror::Error;

use crate::dao::storage::StorageError;

/// Errors that can occur in orchestrator operations.
///
/// Only the primary participant-row mutation of an action surfaces here as a
/// failure; best-effort convergence writes (derived status, host transfer)
/// are swallowed and logged by the orchestrator because the derived view
/// returned to the caller is correct regardless.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// The store's authorization policy refused the action's primary write.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Rejected { message } => ServiceError::Unauthorized(message),
            unavailable => ServiceError::Unavailable(unavailable),
        }
    }
}
