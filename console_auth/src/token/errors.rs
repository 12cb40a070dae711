use thiserror::Error;

use crate::config::SettingsError;
use crate::storage::StorageError;
use crate::userdb::UserError;

#[derive(Debug, Error, Clone)]
pub enum TokenError {
    #[error("Token configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// Bad signature, expired, or malformed. Deliberately indistinguishable.
    #[error("Invalid token")]
    Invalid,

    #[error("Unexpected token type")]
    WrongType,

    #[error("Token has been revoked")]
    Revoked,

    #[error("User is not active: {0}")]
    UserInactive(String),
}

impl From<StorageError> for TokenError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidInput(_) => Self::Invalid,
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<UserError> for TokenError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Storage(msg) => Self::Storage(msg),
            UserError::InvalidData(msg) => Self::UserInactive(msg),
        }
    }
}

impl From<SettingsError> for TokenError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}
