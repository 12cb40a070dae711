mod cache_store;
mod errors;
mod types;

pub(crate) use cache_store::{CacheStore, cache_store, init_cache_store, install_cache_store};
pub use errors::StorageError;
pub use types::{CacheData, CacheKey, CachePrefix};
pub(crate) use types::{Record, decode_record, encode_record};

#[cfg(test)]
pub(crate) use cache_store::InMemoryCacheStore;

/// Initialize the cache store selected by the environment.
pub(crate) async fn init() -> Result<(), StorageError> {
    init_cache_store().await
}
