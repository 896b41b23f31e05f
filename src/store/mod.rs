mod cache;
mod envelope;

pub use cache::{CacheSessionStore, CleanupPolicy};

use serde::{Serialize, de::DeserializeOwned};

use crate::{error::Result, session::SessionId};

/// Per-session key/value storage.
///
/// Values are addressed by `(session id, key)`. Nothing is stored until `set`
/// is called, and entries expire on the backend's schedule.
pub trait SessionStore: Send + Sync + 'static {
    /// Stores `value` under `key` for the session.
    fn set<T>(
        &self,
        id: &SessionId,
        key: &str,
        value: &T,
    ) -> impl Future<Output = Result<()>> + Send
    where
        T: Serialize + Sync + ?Sized;

    /// Loads the value under `key`, failing with `NotFound` when it is absent or expired.
    fn get<T>(&self, id: &SessionId, key: &str) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send;

    /// Removes the session's master entry. Missing entries are not an error.
    fn delete(&self, id: &SessionId) -> impl Future<Output = Result<()>> + Send;
}
