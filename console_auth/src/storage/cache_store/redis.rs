use async_trait::async_trait;
use redis::{self, AsyncCommands, Script};

use crate::storage::errors::StorageError;
use crate::storage::types::{CacheData, CacheKey, CachePrefix, make_key};

use super::types::{CacheStore, RedisCacheStore};

// KEYS[1] target, ARGV[1] "1" if a current value is expected, ARGV[2] expected, ARGV[3] new
const COMPARE_AND_SWAP_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
    if current ~= ARGV[2] then
        return 0
    end
elseif current then
    return 0
end
redis.call('SET', KEYS[1], ARGV[3])
return 1
"#;

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        // Verify the connection works
        let _conn = self.client.get_multiplexed_async_connection().await?;
        Ok(())
    }

    async fn put(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
        value: CacheData,
    ) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = make_key(prefix, key);
        let value = serde_json::to_string(&value)?;
        let _: () = conn.set(&key, value).await?;
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = make_key(prefix, key);
        let value = serde_json::to_string(&value)?;
        // SET with EX in one round trip so the entry never exists without its TTL
        let _: () = conn.set_ex(&key, value, ttl as u64).await?;

        Ok(())
    }

    async fn get(
        &self,
        prefix: CachePrefix,
        key: &CacheKey,
    ) -> Result<Option<CacheData>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = make_key(prefix, key);
        let value: Option<String> = conn.get(&key).await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    async fn remove(&mut self, prefix: CachePrefix, key: &CacheKey) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = make_key(prefix, key);
        let _: () = conn.del(&key).await?;
        Ok(())
    }

    async fn take(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
    ) -> Result<Option<CacheData>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = make_key(prefix, key);
        // GETDEL is atomic on the server
        let value: Option<String> = conn.get_del(&key).await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    async fn compare_and_swap(
        &mut self,
        prefix: CachePrefix,
        key: &CacheKey,
        expected: Option<&CacheData>,
        value: CacheData,
    ) -> Result<bool, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = make_key(prefix, key);
        let (has_expected, expected) = match expected {
            Some(data) => ("1", serde_json::to_string(data)?),
            None => ("0", String::new()),
        };
        let value = serde_json::to_string(&value)?;

        let swapped: i32 = Script::new(COMPARE_AND_SWAP_SCRIPT)
            .key(&key)
            .arg(has_expected)
            .arg(expected)
            .arg(value)
            .invoke_async(&mut conn)
            .await?;

        Ok(swapped == 1)
    }
}
