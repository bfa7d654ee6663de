//! Error types for vellum-client

use thiserror::Error;
use vellum_rbac::CredentialError;

/// Result type alias for vellum-client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur talking to the backend
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, TLS, ...
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A `401` could not be repaired by refreshing the access token.
    ///
    /// Persisted tokens have already been cleared when this is returned.
    #[error("session expired; sign in again")]
    SessionExpired,

    /// Persisted credentials could not be read or written.
    #[error("credential store error: {0}")]
    Credentials(#[from] CredentialError),

    /// A request body could not be encoded or a response body decoded.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Returns the HTTP status for [`ClientError::Api`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns whether the caller must sign in again.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}
