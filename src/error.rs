//! Error types for session and store operations.

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for session and store operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The value could not be serialized.
    #[error("failed to encode session value: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The stored bytes could not be decoded into the requested type.
    #[error("failed to decode session value: {0}")]
    Decoding(#[source] DecodeError),

    /// No entry exists for the key, or it expired.
    #[error("session entry not found: {key}")]
    NotFound { key: String },

    /// The cache backend failed or rejected the request.
    #[error("cache backend error: {0}")]
    Backend(#[source] BoxError),

    /// The request carries no session cookie.
    #[error("request has no session cookie")]
    NoSessionCookie,

    #[error("invalid session cookie name: {0:?}")]
    InvalidCookieName(String),

    #[error("session ttl must be non-zero")]
    InvalidTtl,
}

impl SessionError {
    pub(crate) fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SessionError::Backend(Box::new(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::NotFound { .. })
    }
}

/// Why stored bytes could not be turned back into a value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The envelope was written with a format this crate does not read.
    #[error("unsupported envelope version {0}")]
    Version(u8),
}

/// Error returned while loading a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("env: {name} is not valid unicode")]
    NotUnicode { name: &'static str },

    #[error("env: {name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Result type for session operations.
pub type Result<T, E = SessionError> = ::std::result::Result<T, E>;
