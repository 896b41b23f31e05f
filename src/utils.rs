use std::{env, time::Duration};
#[cfg(feature = "memcached")]
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ConfigError;

/// Reads an optional environment variable. Unset means `None`.
pub(crate) fn get_env(name: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode { name }),
    }
}

#[cfg(feature = "memcached")]
pub(crate) fn utc_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

#[cfg(feature = "memcached")]
pub(crate) fn utc_now_secs() -> u64 {
    utc_now().as_secs()
}

/// Whole seconds of `ttl` as sent to the cache. Zero stays zero ("never
/// expire"); anything shorter than a second rounds up to one.
pub(crate) fn ttl_secs(ttl: Duration) -> u32 {
    if ttl.is_zero() {
        return 0;
    }

    u32::try_from(ttl.as_secs()).unwrap_or(u32::MAX).max(1)
}
