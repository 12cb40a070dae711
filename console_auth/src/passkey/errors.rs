use thiserror::Error;

use crate::config::SettingsError;
use crate::storage::StorageError;
use crate::utils::UtilError;

/// Errors that can occur during passkey ceremonies and credential bookkeeping.
///
/// The variants carry detail for logs. Callers facing the network collapse
/// everything except `Storage`, `Config`, `InvalidInput` and `NotFound` into a
/// single generic verification failure.
#[derive(Debug, Error, Clone)]
pub enum PasskeyError {
    /// Relying party settings are missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown, expired, already consumed or mismatched challenge
    #[error("Invalid challenge: {0}")]
    Challenge(String),

    /// Assertion could not be verified
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Attestation was acceptable but the credential cannot be registered
    #[error("Registration error: {0}")]
    Registration(String),

    /// The cache store failed or is not configured
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid client data: {0}")]
    ClientData(String),

    #[error("Invalid authenticator data: {0}")]
    AuthenticatorData(String),

    /// Cryptographic verification of a signature or statement failed
    #[error("Verification error: {0}")]
    Verification(String),

    #[error("Not found error: {0}")]
    NotFound(String),

    /// Caller-supplied identifier that cannot be used as a key
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<StorageError> for PasskeyError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidInput(msg) => Self::InvalidInput(msg),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<SettingsError> for PasskeyError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error() {
        assert!(matches!(
            PasskeyError::from(StorageError::InvalidInput("a b".to_string())),
            PasskeyError::InvalidInput(_)
        ));
        assert!(matches!(
            PasskeyError::from(StorageError::Conflict("lost".to_string())),
            PasskeyError::Storage(_)
        ));
        assert!(matches!(
            PasskeyError::from(StorageError::NotConfigured("no store".to_string())),
            PasskeyError::Storage(_)
        ));
    }

    #[test]
    fn test_from_util_error() {
        let err: PasskeyError = UtilError::Format("bad base64".to_string()).into();
        assert_eq!(err.to_string(), "Utils error: Invalid format: bad base64");
    }
}
