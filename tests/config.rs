use std::{env, time::Duration};

use axum_session_cache::{
    CacheSessionStore, ConfigError, MemoryCache, SessionConfig, SessionError, SessionManager,
};

// Everything touching the environment lives in this one test so nothing else
// in this binary reads it concurrently.
#[test]
fn from_env() {
    let clear = || unsafe {
        env::remove_var("SESSION_CACHE_ADDR");
        env::remove_var("SESSION_COOKIE_NAME");
        env::remove_var("SESSION_TTL_SECS");
    };

    clear();
    let config = SessionConfig::from_env().unwrap();
    assert!(config == SessionConfig::default());

    unsafe {
        env::set_var("SESSION_CACHE_ADDR", "cache.internal:11211");
        env::set_var("SESSION_COOKIE_NAME", "app-sid");
        env::set_var("SESSION_TTL_SECS", "1800");
    }
    let config = SessionConfig::from_env().unwrap();
    assert!(config.cache_address == "cache.internal:11211");
    assert!(config.cookie_name == "app-sid");
    assert!(config.ttl == Duration::from_secs(1800));

    unsafe {
        env::set_var("SESSION_TTL_SECS", "thirty minutes");
    }
    let err = SessionConfig::from_env().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            name: "SESSION_TTL_SECS",
            ..
        }
    ));

    clear();
}

#[test]
fn config_is_validated_by_manager() {
    let config = SessionConfig::new().with_cookie_name("bad name");
    let store = CacheSessionStore::new(MemoryCache::new(), config.ttl);

    let err = SessionManager::from_config(&config, store).err().unwrap();
    assert!(matches!(err, SessionError::InvalidCookieName(_)));

    let config = SessionConfig::new().with_ttl(Duration::ZERO);
    let store = CacheSessionStore::new(MemoryCache::new(), config.ttl);

    let err = SessionManager::from_config(&config, store).err().unwrap();
    assert!(matches!(err, SessionError::InvalidTtl));
}
