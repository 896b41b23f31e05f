use std::fmt;

use uuid::Uuid;

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Hash, Clone, PartialEq, Eq)]
pub struct SessionId(Box<str>);

impl SessionId {
    /// A fresh identifier from 122 random bits (UUID v4).
    pub fn new() -> Self {
        SessionId(Uuid::new_v4().to_string().into_boxed_str())
    }

    /// Reads an identifier back from a cookie value. Only the hyphenated
    /// UUID form `new` produces is accepted.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() != 36 || Uuid::parse_str(value).is_err() {
            return None;
        }

        Some(SessionId(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
