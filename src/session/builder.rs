use std::{borrow::Cow, sync::Arc, time::Duration};

use crate::{
    error::{Result, SessionError},
    session::{SessionManager, SessionManagerInner, cookies},
    store::SessionStore,
};

pub(crate) static DEFAULT_SESSION_COOKIE_NAME: &str = "session";
pub(crate) const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60 * 24);

pub struct SessionManagerBuilder<S> {
    store: S,
    cookie_name: Cow<'static, str>,
    ttl: Duration,
}

impl SessionManagerBuilder<()> {
    pub fn new() -> SessionManagerBuilder<()> {
        Self {
            store: (),
            cookie_name: Cow::Borrowed(DEFAULT_SESSION_COOKIE_NAME),
            ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl<S> SessionManagerBuilder<S> {
    pub fn cookie_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Lifetime of the session cookie.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn store<S1>(self, store: S1) -> SessionManagerBuilder<S1> {
        SessionManagerBuilder {
            store,
            cookie_name: self.cookie_name,
            ttl: self.ttl,
        }
    }
}

impl<S: SessionStore> SessionManagerBuilder<S> {
    pub fn build(self) -> Result<SessionManager<S>> {
        if !cookies::is_valid_name(&self.cookie_name) {
            return Err(SessionError::InvalidCookieName(self.cookie_name.into_owned()));
        }

        if self.ttl.is_zero() {
            return Err(SessionError::InvalidTtl);
        }

        Ok(SessionManager(Arc::new(SessionManagerInner {
            store: self.store,
            cookie_name: self.cookie_name,
            ttl: self.ttl,
        })))
    }
}

impl Default for SessionManagerBuilder<()> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod builder {
    use std::time::Duration;

    use crate::{
        SessionError,
        cache::MemoryCache,
        session::SessionManager,
        store::CacheSessionStore,
    };

    fn store() -> CacheSessionStore<MemoryCache> {
        CacheSessionStore::new(MemoryCache::new(), Duration::from_secs(60))
    }

    #[test]
    fn defaults() {
        let manager = SessionManager::builder().store(store()).build().unwrap();

        assert!(manager.cookie_name() == "session");
        assert!(manager.ttl() == Duration::from_secs(86_400));
    }

    #[test]
    fn custom() {
        let manager = SessionManager::builder()
            .cookie_name("sid")
            .ttl(Duration::from_secs(900))
            .store(store())
            .build()
            .unwrap();

        assert!(manager.cookie_name() == "sid");
        assert!(manager.ttl() == Duration::from_secs(900));
    }

    #[test]
    fn rejects_bad_cookie_name() {
        let err = SessionManager::builder()
            .cookie_name("my session")
            .store(store())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::InvalidCookieName(name) if name == "my session"));

        let err = SessionManager::builder()
            .cookie_name("")
            .store(store())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::InvalidCookieName(_)));
    }

    #[test]
    fn rejects_zero_ttl() {
        let err = SessionManager::builder()
            .ttl(Duration::ZERO)
            .store(store())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::InvalidTtl));
    }
}
