//! Error types shared by the PostgREST storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while interacting with the PostgREST endpoint.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Required environment variable is missing.
    #[error("missing REST store environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build REST client")]
    ClientBuilder {
        /// Underlying client construction failure.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send REST request to `{path}`")]
    RequestSend {
        /// Table path the request targeted.
        path: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint returned an unexpected status code.
    #[error("unexpected REST response status {status} for `{path}`")]
    RequestStatus {
        /// Table path the request targeted.
        path: String,
        /// Status code returned.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode REST response for `{path}`")]
    DecodeResponse {
        /// Table path the request targeted.
        path: String,
        /// Underlying decode failure.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint returned an empty result where a row was required.
    #[error("REST endpoint returned no row for `{path}`")]
    MissingRow {
        /// Table path the request targeted.
        path: String,
    },
}

impl From<RestDaoError> for StorageError {
    fn from(err: RestDaoError) -> Self {
        match err {
            // The policy layer answers 401/403 on writes it refuses; that is
            // an expected outcome for derived-field writes, not an outage.
            RestDaoError::RequestStatus { ref path, status }
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                StorageError::rejected(format!("status {status} for `{path}`"))
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
