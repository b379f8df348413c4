//! Launch validation errors.

use thiserror::Error;

/// Errors that can occur while validating an LTI launch.
#[derive(Debug, Clone, Error)]
pub enum LtiError {
    /// A required tool registration field is missing or unusable.
    ///
    /// Fatal: a tool without key material or endpoints must fail closed
    /// before any launch is attempted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The key-set endpoint could not be reached or returned no usable keys.
    #[error("Key set unavailable: {0}")]
    KeySetUnavailable(String),

    /// The token could not be parsed at all.
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// No key in the platform's key set verified the token signature.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token names a key id the platform's key set does not contain.
    #[error("Key not found: kid={0}")]
    KeyNotFound(String),

    /// Key type or signing algorithm not supported.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Token issuer doesn't match the registered platform.
    #[error("Invalid issuer: expected '{expected}', got '{actual}'")]
    IssuerMismatch { expected: String, actual: String },

    /// Token audience doesn't contain this tool's client id.
    #[error("Invalid audience: expected '{expected}', got '{actual:?}'")]
    AudienceMismatch {
        expected: String,
        actual: Vec<String>,
    },

    /// The launch session's nonce was already consumed, or the token
    /// carries a different nonce than the one issued for this session.
    #[error("Nonce already used or does not match the launch session")]
    NonceReplay,

    /// The token's expiry has passed.
    #[error("Token expired")]
    TokenExpired,

    /// Token deployment id doesn't match the tool registration.
    #[error("Invalid deployment: expected '{expected}', got '{actual}'")]
    DeploymentMismatch { expected: String, actual: String },

    /// The `state` parameter doesn't match the one issued for this session.
    #[error("State parameter does not match the launch session")]
    StateMismatch,

    /// The launch session outlived its time-to-live.
    #[error("Launch session expired")]
    SessionExpired,
}

/// A convenience result type for launch validation.
pub type Result<T> = std::result::Result<T, LtiError>;

impl From<jsonwebtoken::errors::Error> for LtiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => LtiError::TokenExpired,
            ErrorKind::InvalidSignature => LtiError::InvalidSignature,
            ErrorKind::InvalidIssuer => LtiError::IssuerMismatch {
                expected: "registered platform".into(),
                actual: "token issuer".into(),
            },
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                LtiError::UnsupportedAlgorithm(err.to_string())
            }
            _ => LtiError::MalformedToken(err.to_string()),
        }
    }
}
