use crate::storage::{CacheKey, CachePrefix, cache_store, decode_record, encode_record};

use super::errors::UserError;
use super::types::UserRecord;

/// Read access to `USER:{username}` records.
///
/// The host application is the system of record. The core only reads during
/// login and refresh; `upsert_user` exists for the host and for tests.
pub struct UserDirectory;

impl UserDirectory {
    #[tracing::instrument]
    pub async fn get_user(username: &str) -> Result<Option<UserRecord>, UserError> {
        let key = CacheKey::new(username)?;
        let data = cache_store()?
            .lock()
            .await
            .get(CachePrefix::User, &key)
            .await?;

        let result = data.map(|d| decode_record::<UserRecord>(&d)).transpose();
        match &result {
            Ok(found) => tracing::debug!(found = found.is_some(), "User lookup completed"),
            Err(e) => tracing::error!(error = %e, "User record could not be decoded"),
        }
        Ok(result?)
    }

    #[tracing::instrument(skip(user), fields(username = %user.username))]
    pub async fn upsert_user(user: UserRecord) -> Result<UserRecord, UserError> {
        let key = CacheKey::new(user.username.as_str())?;
        let data = encode_record(&user)?;
        cache_store()?
            .lock()
            .await
            .put(CachePrefix::User, &key, data)
            .await?;

        tracing::info!(status = ?user.status, role = %user.role, "User upsert completed");
        Ok(user)
    }
}
