use std::sync::{LazyLock, OnceLock};
use std::env;
use tokio::sync::Mutex;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};
use crate::storage::errors::StorageError;

pub static GENERIC_CACHE_STORE_TYPE: LazyLock<Option<String>> =
    LazyLock::new(|| env::var("GENERIC_CACHE_STORE_TYPE").ok());

pub static GENERIC_CACHE_STORE_URL: LazyLock<Option<String>> =
    LazyLock::new(|| env::var("GENERIC_CACHE_STORE_URL").ok());

static GENERIC_CACHE_STORE: OnceLock<Mutex<Box<dyn CacheStore>>> = OnceLock::new();

/// Returns the installed cache store, or `NotConfigured` if `init` has not
/// succeeded yet.
pub(crate) fn cache_store() -> Result<&'static Mutex<Box<dyn CacheStore>>, StorageError> {
    GENERIC_CACHE_STORE.get().ok_or_else(|| {
        StorageError::NotConfigured("cache store has not been initialized".to_string())
    })
}

/// Installs `store` unless one is already present. Returns whether it was installed.
pub(crate) fn install_cache_store(store: Box<dyn CacheStore>) -> bool {
    GENERIC_CACHE_STORE.set(Mutex::new(store)).is_ok()
}

/// Builds the cache store selected by `GENERIC_CACHE_STORE_TYPE` and installs it.
pub(crate) async fn init_cache_store() -> Result<(), StorageError> {
    if GENERIC_CACHE_STORE.get().is_some() {
        return Ok(());
    }

    let store_type = GENERIC_CACHE_STORE_TYPE.as_deref().ok_or_else(|| {
        StorageError::NotConfigured("GENERIC_CACHE_STORE_TYPE must be set".to_string())
    })?;

    tracing::info!("Initializing cache store with type: {}", store_type);

    let store: Box<dyn CacheStore> = match store_type {
        "memory" => Box::new(InMemoryCacheStore::new()),
        "redis" => {
            let store_url = GENERIC_CACHE_STORE_URL.as_deref().ok_or_else(|| {
                StorageError::NotConfigured("GENERIC_CACHE_STORE_URL must be set".to_string())
            })?;
            let client = redis::Client::open(store_url).map_err(|e| {
                tracing::error!("Failed to create Redis client: {}", e);
                StorageError::NotConfigured(format!("Failed to create Redis client: {e}"))
            })?;
            let store = RedisCacheStore { client };
            store.init().await.map_err(|e| {
                tracing::error!("Failed to connect to Redis: {}", e);
                StorageError::NotConfigured(format!("Failed to connect to Redis: {e}"))
            })?;
            Box::new(store)
        }
        t => {
            return Err(StorageError::NotConfigured(format!(
                "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
            )));
        }
    };

    if !install_cache_store(store) {
        tracing::debug!("Cache store was installed concurrently, keeping the first one");
    }

    tracing::info!("Connected to cache store: type={}", store_type);

    Ok(())
}
