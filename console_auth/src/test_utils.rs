//! Test utilities module for shared test initialization and helpers
//!
//! Loads `.env_test` (falling back to `.env`), fills in anything still missing
//! with test defaults, and installs an in-memory cache store so every test in
//! the crate sees the same configured environment.

use std::sync::Once;

use crate::storage::{InMemoryCacheStore, install_cache_store};

const TEST_DEFAULTS: &[(&str, &str)] = &[
    ("ORIGIN", "http://127.0.0.1:3000"),
    ("PASSKEY_RP_NAME", "Console Test"),
    ("JWT_SECRET", "test-signing-secret-that-is-long-enough"),
    ("REFRESH_TOKEN_TTL_DAYS", "7"),
    ("CONSOLE_SUPERUSER", "admin"),
    ("GENERIC_CACHE_STORE_TYPE", "memory"),
];

/// Centralized test initialization for all tests across the entire crate
///
/// ## Usage
/// ```rust,ignore
/// use crate::test_utils::init_test_environment;
///
/// #[tokio::test]
/// async fn my_test() {
///     init_test_environment().await;
///     // ... test code that requires the cache store
/// }
/// ```
pub async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        for (name, value) in TEST_DEFAULTS {
            if std::env::var(name).is_err() {
                unsafe {
                    std::env::set_var(name, value);
                }
            }
        }

        install_cache_store(Box::new(InMemoryCacheStore::new()));
    });
}

/// The origin ceremonies in tests must present, as normalized by the settings
pub fn get_test_origin() -> String {
    crate::config::settings()
        .map(|s| s.origin.clone())
        .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
}

/// A username no other test will pick.
pub fn unique_username(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}
