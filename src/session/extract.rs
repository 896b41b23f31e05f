use std::{convert::Infallible, ops::Deref};

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, request::Parts},
};

use crate::session::SessionId;

/// The session named by the request cookie, inserted by
/// [`SessionService`](crate::session::SessionService).
///
/// Extracting it fails with `401 Unauthorized` when the request has no
/// session cookie. Use `Option<ActiveSession>` for routes that work either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct ActiveSession {
    pub id: SessionId,
}

impl ActiveSession {
    pub fn new(id: SessionId) -> Self {
        Self { id }
    }
}

impl Deref for ActiveSession {
    type Target = SessionId;

    fn deref(&self) -> &Self::Target {
        &self.id
    }
}

impl<S> FromRequestParts<S> for ActiveSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, StatusCode> {
        if let Some(session) = parts.extensions.get::<ActiveSession>() {
            Ok(session.clone())
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

impl<S> OptionalFromRequestParts<S> for ActiveSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Infallible> {
        Ok(parts.extensions.get::<ActiveSession>().cloned())
    }
}
