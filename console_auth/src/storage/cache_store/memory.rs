use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;

use crate::storage::errors::StorageError;
use crate::storage::types::{CacheData, CacheKey, CachePrefix, make_key};

use super::types::{CacheStore, InMemoryCacheStore, MemoryEntry};

impl InMemoryCacheStore {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory generic cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    /// Returns the live entry for `key`, dropping it first if it has expired.
    fn live_entry(&mut self, key: &str) -> Option<&MemoryEntry> {
        let expired = self
            .entry
            .get(key)
            .and_then(|e| e.expires_at)
            .is_some_and(|at| at <= Utc::now());
        if expired {
            self.entry.remove(key);
        }
        self.entry.get(key)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn put(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
        value: CacheData,
    ) -> Result<(), StorageError> {
        self.entry.insert(
            make_key(prefix, key),
            MemoryEntry {
                data: value,
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let ttl = i64::try_from(ttl)
            .map_err(|_| StorageError::InvalidInput("TTL value too large".to_string()))?;
        let now = Utc::now();
        let expires_at = Duration::try_seconds(ttl)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| StorageError::InvalidInput("TTL value too large".to_string()))?;

        // Entries read only through `get` are never removed on access
        self.entry.retain(|_, e| e.expires_at.is_none_or(|at| at > now));
        self.entry.insert(
            make_key(prefix, key),
            MemoryEntry {
                data: value,
                expires_at: Some(expires_at),
            },
        );
        Ok(())
    }

    async fn get(
        &self,
        prefix: CachePrefix,
        key: &CacheKey,
    ) -> Result<Option<CacheData>, StorageError> {
        let now = Utc::now();
        Ok(self
            .entry
            .get(&make_key(prefix, key))
            .filter(|e| e.expires_at.is_none_or(|at| at > now))
            .map(|e| e.data.clone()))
    }

    async fn remove(&mut self, prefix: CachePrefix, key: &CacheKey) -> Result<(), StorageError> {
        self.entry.remove(&make_key(prefix, key));
        Ok(())
    }

    async fn take(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
    ) -> Result<Option<CacheData>, StorageError> {
        let key = make_key(prefix, key);
        if self.live_entry(&key).is_none() {
            return Ok(None);
        }
        Ok(self.entry.remove(&key).map(|e| e.data))
    }

    async fn compare_and_swap(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
        expected: Option<&CacheData>,
        value: CacheData,
    ) -> Result<bool, StorageError> {
        let key = make_key(prefix, key);
        let current = self.live_entry(&key).map(|e| &e.data);
        if current != expected {
            return Ok(false);
        }
        self.entry.insert(
            key,
            MemoryEntry {
                data: value,
                expires_at: None,
            },
        );
        Ok(true)
    }
}
