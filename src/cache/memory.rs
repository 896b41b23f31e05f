use std::{collections::HashMap, convert::Infallible, sync::Arc, time::Duration};

use tokio::{
    sync::RwLock,
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, trace};

use crate::cache::CacheClient;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process cache with the same expiry rules as memcached.
///
/// Expired entries are never returned. They are dropped on the next access to
/// their key, by [`purge_expired`](Self::purge_expired), or by a sweeper task
/// started with [`spawn_sweeper`](Self::spawn_sweeper).
pub struct MemoryCache {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryCache {
    fn clone(&self) -> Self {
        MemoryCache {
            inner: self.inner.clone(),
        }
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()).into(),
        }
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let lock = self.inner.read().await;
        lock.values().filter(|e| !e.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every expired entry and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        purge(&self.inner).await
    }

    /// Purges expired entries every `period` (at least one second) on a
    /// background task. The task ends once every clone of this cache is dropped.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let cache = Arc::downgrade(&self.inner);
        let period = period.max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let Some(inner) = cache.upgrade() else {
                    debug!("memory cache dropped, stopping sweeper");
                    break;
                };
                purge(&inner).await;
            }
        })
    }

    /// Whether `key` holds a live entry.
    pub async fn contains(&self, key: &str) -> bool {
        let lock = self.inner.read().await;
        lock.get(key).is_some_and(|e| !e.is_expired(Instant::now()))
    }
}

async fn purge(inner: &RwLock<HashMap<String, Entry>>) -> usize {
    let now = Instant::now();
    let mut lock = inner.write().await;

    let before = lock.len();
    lock.retain(|_, e| !e.is_expired(now));
    let removed = before - lock.len();

    if removed > 0 {
        trace!(removed, "purged expired memory cache entries");
    }
    removed
}

impl CacheClient for MemoryCache {
    type Error = Infallible;

    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u32) -> Result<(), Infallible> {
        let expires_at = (ttl_secs > 0)
            .then(|| Instant::now() + Duration::from_secs(u64::from(ttl_secs)));

        let mut lock = self.inner.write().await;
        lock.insert(key.to_owned(), Entry { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Infallible> {
        let now = Instant::now();
        {
            let lock = self.inner.read().await;
            match lock.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    trace!(key, "memory cache hit");
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => {
                    trace!(key, "memory cache miss");
                    return Ok(None);
                }
            }
        }

        let mut lock = self.inner.write().await;
        if lock.get(key).is_some_and(|e| e.is_expired(now)) {
            trace!(key, "memory cache entry expired");
            lock.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<bool, Infallible> {
        let now = Instant::now();
        let mut lock = self.inner.write().await;
        Ok(lock.remove(key).is_some_and(|e| !e.is_expired(now)))
    }
}

#[cfg(test)]
mod memory {
    use std::time::Duration;

    use crate::cache::{CacheClient, MemoryCache};

    #[tokio::test]
    async fn set_get_delete() {
        let cache = MemoryCache::new();

        cache.set("a", b"one".to_vec(), 0).await.unwrap();
        assert!(cache.get("a").await.unwrap() == Some(b"one".to_vec()));
        assert!(cache.get("b").await.unwrap().is_none());

        assert!(cache.delete("a").await.unwrap());
        assert!(!cache.delete("a").await.unwrap());
        assert!(cache.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overwrite() {
        let cache = MemoryCache::new();

        cache.set("a", b"one".to_vec(), 0).await.unwrap();
        cache.set("a", b"two".to_vec(), 0).await.unwrap();
        assert!(cache.get("a").await.unwrap() == Some(b"two".to_vec()));
        assert!(cache.len().await == 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry() {
        let cache = MemoryCache::new();

        cache.set("short", b"x".to_vec(), 1).await.unwrap();
        cache.set("forever", b"y".to_vec(), 0).await.unwrap();
        assert!(cache.contains("short").await);

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get("short").await.unwrap().is_none());
        assert!(!cache.contains("short").await);
        assert!(cache.get("forever").await.unwrap().is_some());
        assert!(cache.len().await == 1);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_expired() {
        let cache = MemoryCache::new();

        cache.set("short", b"x".to_vec(), 1).await.unwrap();
        cache.set("long", b"y".to_vec(), 60).await.unwrap();
        cache.set("forever", b"z".to_vec(), 0).await.unwrap();
        assert!(cache.purge_expired().await == 0);

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.purge_expired().await == 1);
        assert!(cache.inner.read().await.len() == 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_drops_abandoned_entries() {
        let cache = MemoryCache::new();
        let sweeper = cache.spawn_sweeper(Duration::from_secs(30));

        for i in 0..1_000 {
            cache.set(&format!("session-{i}"), b"x".to_vec(), 1).await.unwrap();
        }
        cache.set("forever", b"y".to_vec(), 0).await.unwrap();

        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(cache.inner.read().await.len() == 1);
        assert!(cache.contains("forever").await);

        drop(cache);
        let finished = tokio::time::timeout(Duration::from_secs(120), sweeper).await;
        assert!(matches!(finished, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let cache = MemoryCache::new();
        let other = cache.clone();

        cache.set("a", b"one".to_vec(), 0).await.unwrap();
        assert!(other.contains("a").await);
        assert!(!other.is_empty().await);
    }
}
