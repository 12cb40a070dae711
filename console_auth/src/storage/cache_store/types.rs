use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::{CacheData, CacheKey, CachePrefix};

pub(crate) struct InMemoryCacheStore {
    pub(super) entry: HashMap<String, MemoryEntry>,
}

#[derive(Clone)]
pub(super) struct MemoryEntry {
    pub(super) data: CacheData,
    pub(super) expires_at: Option<DateTime<Utc>>,
}

pub(crate) struct RedisCacheStore {
    pub(super) client: redis::Client,
}

/// Key-value store the credential lifecycle is built on.
///
/// Implementations must honour per-key TTLs natively; nothing in the crate
/// sweeps expired entries.
#[async_trait]
pub(crate) trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store without expiry.
    async fn put(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
        value: CacheData,
    ) -> Result<(), StorageError>;

    /// Put a value into the store with a TTL in seconds.
    async fn put_with_ttl(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError>;

    /// Get a value from the store. Expired entries read as absent.
    async fn get(
        &self,
        prefix: CachePrefix,
        key: &CacheKey,
    ) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store.
    async fn remove(&mut self, prefix: CachePrefix, key: &CacheKey) -> Result<(), StorageError>;

    /// Atomically fetch and delete a value.
    ///
    /// Of any number of concurrent callers for the same key, at most one
    /// observes `Some`.
    async fn take(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
    ) -> Result<Option<CacheData>, StorageError>;

    /// Write `value` only if the current value equals `expected`
    /// (`None` meaning the key must be absent). Returns false when another
    /// writer got there first. The written value has no expiry.
    async fn compare_and_swap(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
        expected: Option<&CacheData>,
        value: CacheData,
    ) -> Result<bool, StorageError>;
}
