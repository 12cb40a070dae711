use thiserror::Error;

use crate::config::SettingsError;
use crate::passkey::PasskeyError;
use crate::storage::StorageError;
use crate::token::TokenError;
use crate::userdb::UserError;

/// Request-level failures, one variant per response class.
///
/// The `String` payloads of `Configuration` and `Authentication` are detail for
/// the logs; their `Display` output is what leaves the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    /// Store unavailable or not configured, missing signing secret
    #[error("Service is not configured")]
    Configuration(String),

    /// Malformed or missing input
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Missing or invalid caller identity
    #[error("Authentication failed")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Cryptographic or ceremony failure. Never says which check failed.
    #[error("Verification failed")]
    Verification,
}

impl CoordinationError {
    /// Log the error with its detail and hand it back.
    pub fn log(self) -> Self {
        match &self {
            Self::Configuration(detail) | Self::Authentication(detail) => {
                tracing::error!("{}: {}", self, detail)
            }
            _ => tracing::error!("{}", self),
        }
        self
    }

    /// Collapse a ceremony failure. Only store and configuration problems keep
    /// their own class.
    pub(crate) fn from_ceremony(err: PasskeyError) -> Self {
        tracing::error!("Passkey ceremony failed: {}", err);
        match err {
            PasskeyError::Storage(msg) | PasskeyError::Config(msg) => Self::Configuration(msg),
            _ => Self::Verification,
        }
    }

    /// Refresh and revoke failures are identity failures, except for broken
    /// infrastructure.
    pub(crate) fn from_token_exchange(err: TokenError) -> Self {
        tracing::error!("Token exchange failed: {}", err);
        match err {
            TokenError::Storage(msg) | TokenError::Config(msg) => Self::Configuration(msg),
            other => Self::Authentication(other.to_string()),
        }
    }
}

impl From<PasskeyError> for CoordinationError {
    fn from(err: PasskeyError) -> Self {
        tracing::error!("{}", err);
        match err {
            PasskeyError::Storage(msg) | PasskeyError::Config(msg) => Self::Configuration(msg),
            PasskeyError::NotFound(msg) => Self::NotFound(msg),
            PasskeyError::InvalidInput(msg) => Self::Validation(msg),
            _ => Self::Verification,
        }
    }
}

impl From<TokenError> for CoordinationError {
    fn from(err: TokenError) -> Self {
        tracing::error!("{}", err);
        match err {
            TokenError::Storage(msg) | TokenError::Config(msg) => Self::Configuration(msg),
            _ => Self::Verification,
        }
    }
}

impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        tracing::error!("{}", err);
        match err {
            UserError::Storage(msg) => Self::Configuration(msg),
            UserError::InvalidData(msg) => Self::Validation(msg),
        }
    }
}

impl From<StorageError> for CoordinationError {
    fn from(err: StorageError) -> Self {
        tracing::error!("{}", err);
        match err {
            StorageError::InvalidInput(msg) => Self::Validation(msg),
            other => Self::Configuration(other.to_string()),
        }
    }
}

impl From<SettingsError> for CoordinationError {
    fn from(err: SettingsError) -> Self {
        let error = Self::Configuration(err.to_string());
        tracing::error!("{}: {}", error, err);
        error
    }
}
