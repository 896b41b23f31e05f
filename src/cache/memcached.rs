use std::sync::Arc;

use memcache::{Client, MemcacheError};
use tokio::task::{self, JoinError};
use tracing::debug;

use crate::{cache::CacheClient, utils::utc_now_secs};

/// memcached treats expirations above this many seconds as unix timestamps.
const MAX_RELATIVE_EXPIRATION: u32 = 60 * 60 * 24 * 30;

/// Longest key the memcached text protocol accepts.
const MAX_KEY_LEN: usize = 250;

/// Socket read/write timeout, in seconds, when the address does not set one.
const DEFAULT_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, thiserror::Error)]
pub enum MemcachedError {
    #[error(transparent)]
    Memcache(#[from] MemcacheError),

    #[error("memcached task failed: {0}")]
    Join(#[from] JoinError),

    /// Too long, or contains whitespace or control bytes.
    #[error("malformed memcached key {0:?}")]
    MalformedKey(String),
}

/// [`CacheClient`] backed by a memcached server.
///
/// The underlying client is blocking and pooled; every call runs on tokio's
/// blocking pool. A call already handed to that pool keeps running after its
/// future is dropped, its result is discarded.
pub struct MemcacheClient {
    client: Arc<Client>,
}

impl Clone for MemcacheClient {
    fn clone(&self) -> Self {
        MemcacheClient {
            client: self.client.clone(),
        }
    }
}

impl MemcacheClient {
    /// Connects to `address`, either `host:port` or a full `memcache://` URL.
    ///
    /// Without a `timeout` query parameter (seconds), socket reads and writes
    /// give up after 3 seconds.
    pub async fn connect(address: &str) -> Result<Self, MemcachedError> {
        let url = normalize_address(address);
        debug!(%url, "connecting to memcached");

        let client = task::spawn_blocking(move || Client::connect(url)).await??;

        Ok(MemcacheClient {
            client: Arc::new(client),
        })
    }

    /// Releases this handle. The connection pool closes once every clone is gone.
    pub fn close(self) {
        debug!("closing memcached client");
        drop(self.client);
    }

    async fn run<T, F>(&self, f: F) -> Result<T, MemcachedError>
    where
        T: Send + 'static,
        F: FnOnce(&Client) -> Result<T, MemcacheError> + Send + 'static,
    {
        let client = self.client.clone();
        let out = task::spawn_blocking(move || f(&client)).await??;
        Ok(out)
    }
}

impl CacheClient for MemcacheClient {
    type Error = MemcachedError;

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u32) -> Result<(), MemcachedError> {
        let key = check_key(key)?;
        let expiration = expiration(ttl_secs, utc_now_secs());
        self.run(move |c| c.set(&key, value.as_slice(), expiration))
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, MemcachedError> {
        let key = check_key(key)?;
        self.run(move |c| c.get::<Vec<u8>>(&key)).await
    }

    async fn delete(&self, key: &str) -> Result<bool, MemcachedError> {
        let key = check_key(key)?;
        self.run(move |c| c.delete(&key)).await
    }
}

/// Rejects keys the text protocol cannot carry: longer than 250 bytes, or
/// containing whitespace or control bytes.
fn check_key(key: &str) -> Result<String, MemcachedError> {
    let malformed = key.len() > MAX_KEY_LEN || key.bytes().any(|b| b <= b' ' || b == 0x7f);

    if malformed {
        debug!(key, "refusing malformed memcached key");
        return Err(MemcachedError::MalformedKey(key.to_owned()));
    }

    Ok(key.to_owned())
}

fn normalize_address(address: &str) -> String {
    let mut url = if address.contains("://") {
        address.to_owned()
    } else {
        format!("memcache://{address}")
    };

    let has_timeout = url.split_once('?').is_some_and(|(_, query)| {
        query
            .split('&')
            .any(|pair| pair.split('=').next() == Some("timeout"))
    });

    if !has_timeout {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&format!("timeout={DEFAULT_TIMEOUT_SECS}"));
    }

    url
}

fn expiration(ttl_secs: u32, now_secs: u64) -> u32 {
    if ttl_secs <= MAX_RELATIVE_EXPIRATION {
        return ttl_secs;
    }

    u32::try_from(now_secs + u64::from(ttl_secs)).unwrap_or(u32::MAX)
}
