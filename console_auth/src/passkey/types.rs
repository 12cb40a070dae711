use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::Record;

/// Which ceremony a challenge was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CeremonyType {
    Registration,
    Authentication,
}

/// What a challenge is bound to, stored under `PASSKEY_CHALLENGE:{value}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChallengeRecord {
    pub username: String,
    pub ceremony: CeremonyType,
}

impl Record for ChallengeRecord {
    const KIND: &'static str = "passkey_challenge";
    const VERSION: u32 = 1;
}

/// A registered passkey, including key material. Never leaves the crate
/// except as a [`CredentialView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredCredential {
    /// base64url credential id as reported by the authenticator
    pub credential_id: String,
    /// base64url uncompressed P-256 point (`0x04 || x || y`)
    pub public_key: String,
    /// Signature counter from the last accepted assertion
    pub counter: u32,
    #[serde(default)]
    pub transports: Vec<String>,
    pub aaguid: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Per-user credential list, kept in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct UserCredentials {
    pub(crate) credentials: Vec<StoredCredential>,
}

impl Record for UserCredentials {
    const KIND: &'static str = "passkey_credentials";
    const VERSION: u32 = 1;
}

/// Public projection of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialView {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredCredential> for CredentialView {
    fn from(credential: &StoredCredential) -> Self {
        Self {
            id: credential.credential_id.clone(),
            name: credential.name.clone(),
            created_at: credential.created_at,
        }
    }
}
