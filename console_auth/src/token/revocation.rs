use chrono::Utc;

use crate::storage::{CacheKey, CachePrefix, cache_store, encode_record};

use super::errors::TokenError;
use super::types::RevokedToken;

/// Set of refresh-token identifiers that must no longer be honoured.
///
/// Entries expire together with the token they block, so the ledger never
/// outgrows the set of live refresh tokens.
pub struct RevocationLedger;

impl RevocationLedger {
    /// Record `token_id` as revoked until `expires_at` (unix seconds).
    ///
    /// Returns false without writing when the token has already expired.
    pub async fn revoke(token_id: &str, expires_at: i64) -> Result<bool, TokenError> {
        let now = Utc::now().timestamp();
        let remaining = expires_at - now;
        if remaining <= 0 {
            tracing::debug!(token_id, "Token already expired, nothing to revoke");
            return Ok(false);
        }

        let key = CacheKey::new(token_id)?;
        let data = encode_record(&RevokedToken { revoked_at: now })?;
        cache_store()?
            .lock()
            .await
            .put_with_ttl(
                CachePrefix::RevokedRefreshToken,
                &key,
                data,
                remaining as usize,
            )
            .await?;

        tracing::info!(token_id, ttl = remaining, "Refresh token revoked");
        Ok(true)
    }

    pub async fn is_revoked(token_id: &str) -> Result<bool, TokenError> {
        let key = CacheKey::new(token_id)?;
        let found = cache_store()?
            .lock()
            .await
            .get(CachePrefix::RevokedRefreshToken, &key)
            .await?;
        Ok(found.is_some())
    }
}
