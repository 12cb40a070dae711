use crate::passkey::errors::PasskeyError;
use crate::passkey::types::{CeremonyType, ChallengeRecord};
use crate::storage::{CacheKey, CachePrefix, cache_store, decode_record, encode_record};
use crate::utils::gen_random_string;

/// Lifetime of a minted challenge in seconds.
pub(crate) const CHALLENGE_TTL_SECS: usize = 300;

/// Mints one-time ceremony challenges and consumes them.
///
/// A challenge validates at most once: consumption is an atomic
/// fetch-and-delete, so concurrent submissions of the same response race for
/// a single record and all but one see nothing.
pub struct ChallengeStore;

impl ChallengeStore {
    pub async fn mint(username: &str, ceremony: CeremonyType) -> Result<String, PasskeyError> {
        Self::mint_with_ttl(username, ceremony, CHALLENGE_TTL_SECS).await
    }

    pub(crate) async fn mint_with_ttl(
        username: &str,
        ceremony: CeremonyType,
        ttl: usize,
    ) -> Result<String, PasskeyError> {
        let value = gen_random_string(32)?;
        let key = CacheKey::new(value.as_str())?;
        let record = ChallengeRecord {
            username: username.to_string(),
            ceremony,
        };

        cache_store()?
            .lock()
            .await
            .put_with_ttl(CachePrefix::PasskeyChallenge, &key, encode_record(&record)?, ttl)
            .await?;

        tracing::debug!(username, ?ceremony, "Challenge minted");
        Ok(value)
    }

    /// Fetch and delete the record bound to `value`.
    ///
    /// Returns `None` for an unknown, expired or already consumed challenge.
    pub async fn consume(value: &str) -> Result<Option<ChallengeRecord>, PasskeyError> {
        let Ok(key) = CacheKey::new(value) else {
            tracing::debug!("Challenge value is not a usable key");
            return Ok(None);
        };

        let data = cache_store()?
            .lock()
            .await
            .take(CachePrefix::PasskeyChallenge, &key)
            .await?;

        match data {
            Some(data) => Ok(Some(decode_record(&data)?)),
            None => Ok(None),
        }
    }

    /// Consume `value` and check that it was minted for `username` and `ceremony`.
    ///
    /// The challenge is burned whether or not it matches.
    pub async fn consume_and_validate(
        value: &str,
        username: &str,
        ceremony: CeremonyType,
    ) -> Result<bool, PasskeyError> {
        let Some(record) = Self::consume(value).await? else {
            tracing::debug!(username, "Challenge missing, expired or already used");
            return Ok(false);
        };

        let valid = record.username == username && record.ceremony == ceremony;
        if !valid {
            tracing::debug!(
                expected_user = username,
                bound_user = %record.username,
                expected = ?ceremony,
                bound = ?record.ceremony,
                "Challenge binding mismatch"
            );
        }
        Ok(valid)
    }
}
