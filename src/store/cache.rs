use std::{collections::BTreeSet, time::Duration};

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    cache::CacheClient,
    error::{DecodeError, Result, SessionError},
    session::SessionId,
    store::{SessionStore, envelope},
    utils::ttl_secs,
};

/// What [`SessionStore::delete`] removes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Only the bare session id key. Values written with `set` stay in the
    /// cache until their TTL runs out.
    #[default]
    MasterKeyOnly,
    /// Keep an index of written keys under the session id and remove every
    /// indexed value on delete. Index updates are read-modify-write and may
    /// lose a key when the same session is written concurrently.
    TrackKeys,
}

/// [`SessionStore`] that writes every value to a [`CacheClient`] under
/// `"{session_id}:{key}"`.
pub struct CacheSessionStore<C> {
    client: C,
    ttl: Duration,
    cleanup: CleanupPolicy,
}

impl<C: Clone> Clone for CacheSessionStore<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            ttl: self.ttl,
            cleanup: self.cleanup,
        }
    }
}

impl<C: CacheClient> CacheSessionStore<C> {
    pub fn new(client: C, ttl: Duration) -> Self {
        Self {
            client,
            ttl,
            cleanup: CleanupPolicy::default(),
        }
    }

    pub fn with_cleanup(mut self, cleanup: CleanupPolicy) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn cleanup(&self) -> CleanupPolicy {
        self.cleanup
    }

    /// Gives the cache client back, e.g. to close it on shutdown.
    pub fn into_client(self) -> C {
        self.client
    }

    async fn tracked_keys(&self, id: &SessionId) -> Result<BTreeSet<String>> {
        match self.client.get(id.as_str()).await.map_err(SessionError::backend)? {
            Some(bytes) => envelope::decode(&bytes),
            None => Ok(BTreeSet::new()),
        }
    }

    async fn track(&self, id: &SessionId, key: &str, ttl: u32) -> Result<()> {
        let mut keys = self.tracked_keys(id).await?;
        keys.insert(key.to_owned());

        let bytes = envelope::encode(&keys)?;
        self.client
            .set(id.as_str(), bytes, ttl)
            .await
            .map_err(SessionError::backend)
    }

    async fn remove_tracked(&self, id: &SessionId) -> Result<()> {
        let keys = match self.tracked_keys(id).await {
            Ok(keys) => keys,
            Err(SessionError::Backend(e)) => return Err(SessionError::Backend(e)),
            Err(e) => {
                warn!(session_id = %id, error = %e, "unreadable session key index");
                return Ok(());
            }
        };

        for key in &keys {
            self.client
                .delete(&entry_key(id, key))
                .await
                .map_err(SessionError::backend)?;
        }

        debug!(session_id = %id, count = keys.len(), "removed tracked session values");
        Ok(())
    }
}

impl<C: CacheClient> SessionStore for CacheSessionStore<C> {
    async fn set<T>(&self, id: &SessionId, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let bytes = envelope::encode(value)?;
        let ttl = ttl_secs(self.ttl);

        self.client
            .set(&entry_key(id, key), bytes, ttl)
            .await
            .map_err(SessionError::backend)?;

        if self.cleanup == CleanupPolicy::TrackKeys {
            self.track(id, key, ttl).await?;
        }

        debug!(session_id = %id, key, "stored session value");
        Ok(())
    }

    async fn get<T>(&self, id: &SessionId, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let entry = entry_key(id, key);

        let Some(bytes) = self
            .client
            .get(&entry)
            .await
            .map_err(SessionError::backend)?
        else {
            debug!(session_id = %id, key, "session value not found");
            return Err(SessionError::NotFound { key: entry });
        };

        envelope::decode(&bytes).inspect_err(|e| {
            if let SessionError::Decoding(DecodeError::Version(version)) = e {
                warn!(session_id = %id, key, version, "unsupported session value envelope");
            }
        })
    }

    async fn delete(&self, id: &SessionId) -> Result<()> {
        if self.cleanup == CleanupPolicy::TrackKeys {
            self.remove_tracked(id).await?;
        }

        let removed = self
            .client
            .delete(id.as_str())
            .await
            .map_err(SessionError::backend)?;

        debug!(session_id = %id, removed, "deleted session");
        Ok(())
    }
}

pub(crate) fn entry_key(id: &SessionId, key: &str) -> String {
    format!("{}:{key}", id.as_str())
}
