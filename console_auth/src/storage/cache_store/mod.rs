mod config;
mod memory;
mod redis;
mod types;

pub(crate) use config::{cache_store, init_cache_store, install_cache_store};
pub(crate) use types::CacheStore;
// InMemoryCacheStore is only exported for tests
#[cfg(test)]
pub(crate) use types::InMemoryCacheStore;
