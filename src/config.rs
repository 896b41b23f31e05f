//! Configuration for the session layer.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::{
    error::ConfigError,
    session::{DEFAULT_SESSION_COOKIE_NAME, DEFAULT_SESSION_TTL},
    utils::get_env,
};

/// Default memcached address.
pub const DEFAULT_CACHE_ADDRESS: &str = "127.0.0.1:11211";

pub const ENV_CACHE_ADDRESS: &str = "SESSION_CACHE_ADDR";
pub const ENV_COOKIE_NAME: &str = "SESSION_COOKIE_NAME";
pub const ENV_TTL_SECS: &str = "SESSION_TTL_SECS";

/// Where the cache lives, what the cookie is called and how long sessions last.
///
/// Deserializes from e.g.
///
/// ```toml
/// cache_address = "cache:11211"
/// cookie_name = "sid"
/// ttl_secs = 3600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// `host:port` of the cache backend.
    pub cache_address: String,

    pub cookie_name: String,

    /// Lifetime of cache entries and of the session cookie.
    #[serde(rename = "ttl_secs", deserialize_with = "deserialize_secs")]
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_address: DEFAULT_CACHE_ADDRESS.to_owned(),
            cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_owned(),
            ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_address(mut self, address: impl Into<String>) -> Self {
        self.cache_address = address.into();
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Defaults overridden by `SESSION_CACHE_ADDR`, `SESSION_COOKIE_NAME` and
    /// `SESSION_TTL_SECS` where set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(address) = get_env(ENV_CACHE_ADDRESS)? {
            config.cache_address = address;
        }

        if let Some(name) = get_env(ENV_COOKIE_NAME)? {
            config.cookie_name = name;
        }

        if let Some(ttl) = get_env(ENV_TTL_SECS)? {
            config.ttl = parse_secs(ENV_TTL_SECS, &ttl)?;
        }

        Ok(config)
    }
}

fn parse_secs(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidValue {
            name,
            value: value.to_owned(),
            reason: e.to_string(),
        })
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}
