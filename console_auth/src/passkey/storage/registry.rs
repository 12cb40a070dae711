use chrono::Utc;

use crate::passkey::errors::PasskeyError;
use crate::passkey::types::{CredentialView, StoredCredential, UserCredentials};
use crate::storage::{
    CacheData, CacheKey, CachePrefix, StorageError, cache_store, decode_record, encode_record,
};

/// Attempts at an optimistic read-modify-write before giving up.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Ordered per-user credential lists under `PASSKEY_CREDS:{username}`.
///
/// Writes are optimistic: read the list, modify it, and write it back only if
/// nobody changed it in between. Uniqueness of credential ids is the
/// ceremony's concern, not the registry's.
pub struct CredentialRegistry;

impl CredentialRegistry {
    /// Credentials with key material, for the ceremonies.
    pub(crate) async fn credentials(username: &str) -> Result<Vec<StoredCredential>, PasskeyError> {
        let key = CacheKey::new(username)?;
        let (_, list) = Self::load(&key).await?;
        Ok(list.credentials)
    }

    pub async fn list(username: &str) -> Result<Vec<CredentialView>, PasskeyError> {
        Ok(Self::credentials(username)
            .await?
            .iter()
            .map(CredentialView::from)
            .collect())
    }

    #[tracing::instrument(skip(credential), fields(credential_id = %credential.credential_id))]
    pub async fn add(username: &str, credential: StoredCredential) -> Result<(), PasskeyError> {
        Self::modify(username, |list| {
            list.push(credential.clone());
            (true, ())
        })
        .await?;
        tracing::info!("Credential added");
        Ok(())
    }

    /// Returns true only if an entry was removed.
    #[tracing::instrument]
    pub async fn remove(username: &str, credential_id: &str) -> Result<bool, PasskeyError> {
        let removed = Self::modify(username, |list| {
            let before = list.len();
            list.retain(|c| c.credential_id != credential_id);
            let removed = list.len() != before;
            (removed, removed)
        })
        .await?;
        tracing::info!(removed, "Credential removal completed");
        Ok(removed)
    }

    /// Store a new signature counter and mark the credential as used.
    ///
    /// Returns false if the credential no longer exists.
    pub async fn update_counter(
        username: &str,
        credential_id: &str,
        counter: u32,
    ) -> Result<bool, PasskeyError> {
        let now = Utc::now();
        Self::modify(username, |list| {
            match list.iter_mut().find(|c| c.credential_id == credential_id) {
                Some(credential) => {
                    credential.counter = counter;
                    credential.last_used_at = Some(now);
                    (true, true)
                }
                None => (false, false),
            }
        })
        .await
    }

    async fn load(key: &CacheKey) -> Result<(Option<CacheData>, UserCredentials), PasskeyError> {
        let data = cache_store()?
            .lock()
            .await
            .get(CachePrefix::PasskeyCredentials, key)
            .await?;

        let list = match &data {
            Some(d) => decode_record::<UserCredentials>(d)?,
            None => UserCredentials::default(),
        };
        Ok((data, list))
    }

    /// Apply `f` to the user's list and write it back if it reports a change.
    async fn modify<F, R>(username: &str, mut f: F) -> Result<R, PasskeyError>
    where
        F: FnMut(&mut Vec<StoredCredential>) -> (bool, R),
    {
        let key = CacheKey::new(username)?;

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let (current, mut list) = Self::load(&key).await?;
            let (changed, result) = f(&mut list.credentials);
            if !changed {
                return Ok(result);
            }

            let swapped = cache_store()?
                .lock()
                .await
                .compare_and_swap(
                    CachePrefix::PasskeyCredentials,
                    &key,
                    current.as_ref(),
                    encode_record(&list)?,
                )
                .await?;

            if swapped {
                return Ok(result);
            }
            tracing::debug!(attempt, "Credential list changed underneath us, retrying");
        }

        tracing::warn!(username, "Giving up on credential list update");
        Err(StorageError::Conflict(format!(
            "credential list for {username} kept changing"
        ))
        .into())
    }
}
