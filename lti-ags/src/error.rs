//! Errors for the Assignment & Grades Service client.

use thiserror::Error;

/// Errors that can occur on AGS operations.
#[derive(Debug, Error)]
pub enum AgsError {
    /// The operation's capability was not granted by the platform.
    ///
    /// Raised before any network access; a missing grant must never be
    /// discovered via a platform-side 403.
    #[error("{operation} not allowed: capability '{capability}' not granted")]
    CapabilityDenied {
        /// The AGS operation that was attempted.
        operation: &'static str,
        /// The capability it requires.
        capability: &'static str,
    },

    /// The request never completed: connection failure or timeout.
    /// Retryable by the caller; the client never retries on its own.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The platform answered with a non-success status.
    #[error("Platform rejected the request: status {status}: {body}")]
    RemoteRejected {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnosis.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A line-item or collection URL is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// A convenience result type for AGS operations.
pub type Result<T> = std::result::Result<T, AgsError>;

impl From<reqwest::Error> for AgsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AgsError::Decode(err.to_string())
        } else {
            AgsError::Transport(err.to_string())
        }
    }
}
