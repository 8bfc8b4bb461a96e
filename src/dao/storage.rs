use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or returned a transport-level failure.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable description of the failed operation.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The backend refused the write under its authorization policy.
    ///
    /// Row-level policies are enforced server-side and cannot be inspected by
    /// this client, so a rejection is a normal outcome on derived-field
    /// writes, not an exceptional one.
    #[error("write rejected by store policy: {message}")]
    Rejected {
        /// Human readable description of the rejected write.
        message: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a policy-rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        StorageError::Rejected {
            message: message.into(),
        }
    }

    /// Whether this failure is an authorization rejection rather than an outage.
    pub fn is_rejected(&self) -> bool {
        matches!(self, StorageError::Rejected { .. })
    }
}
