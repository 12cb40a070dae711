use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::StorageError;

/// Data stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheData {
    pub value: String,
}

/// Key namespaces of the key-value contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachePrefix {
    /// `PASSKEY_CHALLENGE:{value}`, short-lived ceremony challenges
    PasskeyChallenge,
    /// `PASSKEY_CREDS:{username}`, ordered credential list per user
    PasskeyCredentials,
    /// `REVOKED_RT:{token_id}`, revoked refresh token identifiers
    RevokedRefreshToken,
    /// `USER:{username}`, user status records owned by the host application
    User,
}

impl CachePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PasskeyChallenge => "PASSKEY_CHALLENGE",
            Self::PasskeyCredentials => "PASSKEY_CREDS",
            Self::RevokedRefreshToken => "REVOKED_RT",
            Self::User => "USER",
        }
    }
}

const MAX_KEY_LENGTH: usize = 250;

/// Validated key component.
///
/// Rejects anything that could be used to break out of the `PREFIX:key`
/// layout or smuggle commands into a text protocol: whitespace, control
/// characters and the `:` separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();

        if key.is_empty() {
            return Err(StorageError::InvalidInput(
                "Cache key cannot be empty".to_string(),
            ));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(StorageError::InvalidInput(format!(
                "Cache key exceeds {MAX_KEY_LENGTH} bytes"
            )));
        }
        if key
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == ':')
        {
            return Err(StorageError::InvalidInput(
                "Cache key contains forbidden characters".to_string(),
            ));
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub(crate) fn make_key(prefix: CachePrefix, key: &CacheKey) -> String {
    format!("{}:{}", prefix.as_str(), key.as_str())
}

/// An entity persisted through the versioned record envelope.
pub(crate) trait Record: Serialize + DeserializeOwned {
    const KIND: &'static str;
    const VERSION: u32;
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope<T> {
    kind: String,
    version: u32,
    data: T,
}

pub(crate) fn encode_record<T: Record>(record: &T) -> Result<CacheData, StorageError> {
    let envelope = Envelope {
        kind: T::KIND.to_string(),
        version: T::VERSION,
        data: record,
    };
    Ok(CacheData {
        value: serde_json::to_string(&envelope)?,
    })
}

pub(crate) fn decode_record<T: Record>(data: &CacheData) -> Result<T, StorageError> {
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(&data.value)
        .map_err(|e| StorageError::Schema(format!("Unrecognized record envelope: {e}")))?;

    if envelope.kind != T::KIND {
        return Err(StorageError::Schema(format!(
            "Expected record kind '{}', found '{}'",
            T::KIND,
            envelope.kind
        )));
    }
    if envelope.version != T::VERSION {
        return Err(StorageError::Schema(format!(
            "Unsupported {} record version {}",
            T::KIND,
            envelope.version
        )));
    }

    serde_json::from_value(envelope.data)
        .map_err(|e| StorageError::Schema(format!("Malformed {} record: {e}", T::KIND)))
}
