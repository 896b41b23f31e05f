//! Cookie sessions for axum with per-session data kept in an external cache.
//!
//! - [`SessionManager`] issues session ids as `HttpOnly`, `Secure` cookies,
//!   reads them back and expires them on logout.
//! - [`SessionStore`] keeps values per `(session id, key)`;
//!   [`CacheSessionStore`] writes them to any [`CacheClient`] under
//!   `"{session_id}:{key}"` with the configured TTL.
//! - [`MemcacheClient`] (feature `memcached`) and [`MemoryCache`] are the
//!   bundled cache clients.
//!
//! ```rust,ignore
//! use axum_session_cache::{
//!     CacheSessionStore, MemcacheClient, SessionConfig, SessionManager, SessionStore,
//! };
//!
//! let config = SessionConfig::from_env()?;
//! let client = MemcacheClient::connect(&config.cache_address).await?;
//! let sessions = SessionManager::from_config(
//!     &config,
//!     CacheSessionStore::new(client, config.ttl),
//! )?;
//!
//! let mut headers = HeaderMap::new();
//! let id = sessions.new_session(&mut headers);
//! sessions.store().set(&id, "cart", &["item1", "item2"]).await?;
//! ```

pub mod cache;
pub mod config;
mod error;
pub mod session;
pub mod store;
pub(crate) mod utils;

#[cfg(feature = "memcached")]
pub use cache::{MemcacheClient, MemcachedError};
pub use cache::{CacheClient, MemoryCache};
pub use config::SessionConfig;
pub use error::{ConfigError, DecodeError, Result, SessionError};
pub use session::{ActiveSession, SessionId, SessionManager, SessionManagerBuilder};
pub use store::{CacheSessionStore, CleanupPolicy, SessionStore};
