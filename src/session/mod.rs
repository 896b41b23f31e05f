mod builder;
mod cookies;
mod extract;
mod id;
mod service;

use std::{borrow::Cow, sync::Arc, time::Duration};

use ::cookie::Cookie;
use http::HeaderMap;
use tracing::{debug, warn};

pub use builder::SessionManagerBuilder;
pub(crate) use builder::{DEFAULT_SESSION_COOKIE_NAME, DEFAULT_SESSION_TTL};
pub use extract::ActiveSession;
pub use id::SessionId;
pub use service::SessionService;

use crate::{
    config::SessionConfig,
    error::{Result, SessionError},
    store::SessionStore,
};

/// Issues session ids as cookies and tears sessions down.
///
/// Cloning is cheap; clones share the store.
pub struct SessionManager<S>(Arc<SessionManagerInner<S>>);

struct SessionManagerInner<S> {
    store: S,
    cookie_name: Cow<'static, str>,
    ttl: Duration,
}

impl SessionManager<()> {
    pub fn builder() -> SessionManagerBuilder<()> {
        SessionManagerBuilder::new()
    }
}

impl<S: SessionStore> SessionManager<S> {
    pub fn from_config(config: &SessionConfig, store: S) -> Result<Self> {
        SessionManager::builder()
            .cookie_name(config.cookie_name.clone())
            .ttl(config.ttl)
            .store(store)
            .build()
    }

    /// Starts a new session: appends its cookie to `response` and returns the id.
    ///
    /// Nothing is written to the store.
    pub fn new_session(&self, response: &mut HeaderMap) -> SessionId {
        let session_id = SessionId::new();
        let cookie = self.session_cookie(&session_id);
        cookies::append_set_cookie(response, &cookie);

        debug!(session_id = %session_id, "issued session");
        session_id
    }

    /// Deletes the session named by the request cookie (if any) and expires
    /// the cookie on `response`. Store failures are logged, not returned.
    pub async fn destroy_session(&self, response: &mut HeaderMap, request: &HeaderMap) {
        if let Ok(session_id) = self.get_session(request) {
            match self.0.store.delete(&session_id).await {
                Ok(()) => debug!(session_id = %session_id, "destroyed session"),
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "failed to delete session data")
                }
            }
        }

        cookies::append_set_cookie(response, &self.removal_cookie());
    }
}

impl<S> SessionManager<S> {
    /// Reads the session id from the request's cookies.
    ///
    /// A value that is not a session id this manager could have issued counts
    /// as no cookie at all and never reaches the store.
    pub fn get_session(&self, request: &HeaderMap) -> Result<SessionId> {
        let value = cookies::find_cookie(request, &self.0.cookie_name)
            .filter(|value| !value.is_empty())
            .ok_or(SessionError::NoSessionCookie)?;

        SessionId::parse(&value).ok_or_else(|| {
            debug!(cookie = self.cookie_name(), "ignoring malformed session cookie");
            SessionError::NoSessionCookie
        })
    }

    /// The cookie `new_session` sets for `session_id`.
    pub fn session_cookie(&self, session_id: &SessionId) -> Cookie<'static> {
        cookies::session_cookie(
            &self.0.cookie_name,
            session_id.as_str(),
            cookies::expires_in(self.0.ttl),
        )
    }

    /// The cookie `destroy_session` sets: empty and already expired.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        cookies::session_cookie(&self.0.cookie_name, "", cookies::expired())
    }

    pub fn store(&self) -> &S {
        &self.0.store
    }

    pub fn cookie_name(&self) -> &str {
        &self.0.cookie_name
    }

    pub fn ttl(&self) -> Duration {
        self.0.ttl
    }
}

impl<S> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        SessionManager(self.0.clone())
    }
}
