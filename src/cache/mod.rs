//! Key/value cache backends the session store writes through.

#[cfg(feature = "memcached")]
mod memcached;
mod memory;

#[cfg(feature = "memcached")]
pub use memcached::{MemcacheClient, MemcachedError};
pub use memory::MemoryCache;

/// A remote (or in-process) key/value cache with per-entry expiry.
///
/// `ttl_secs` follows memcached semantics: `0` means the entry never expires.
/// Expiry is enforced by the backend; callers never see expired entries.
pub trait CacheClient: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_secs: u32,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send;

    /// Removes `key`. Returns whether an entry was removed; a missing key is not an error.
    fn delete(&self, key: &str) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}
