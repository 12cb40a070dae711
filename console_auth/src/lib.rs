//! console_auth - credential lifecycle for a single-tenant admin console
//!
//! Passkey enrollment and login, HS256 access/refresh tokens and server-side
//! refresh-token revocation, all kept in a key-value cache store (in-memory or
//! Redis) without transactions or locks.
//!
//! HTTP handlers call the `*_core` functions re-exported here and map
//! [`CoordinationError`] onto responses. Call [`init`] once at startup.

mod config;
mod coordination;
mod passkey;
mod storage;
mod token;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use coordination::{
    AuthenticatedUser, AuthenticationStartRequest, CoordinationError, LoginResponse,
    RefreshTokenRequest, delete_passkey_credential_core, handle_finish_authentication_core,
    handle_finish_registration_core, handle_start_authentication_core,
    handle_start_registration_core, issue_token_pair, list_credentials_core, refresh_token_core,
    revoke_token_core, verify_access_token_core,
};

// Re-export the route prefix
pub use config::{CONSOLE_AUTH_ROUTE_PREFIX, Settings, SettingsError, SettingsOverrides};

pub use passkey::{
    AuthenticationOptions, AuthenticatorResponse, CredentialView, RegisterCredential,
    RegistrationOptions,
};

pub use token::{RefreshOutcome, TokenPair};

pub use userdb::{Role, UserDirectory, UserError, UserRecord, UserStatus};

/// Validate configuration and connect the cache store.
///
/// Fails with [`CoordinationError::Configuration`] when a setting is invalid,
/// `JWT_SECRET` is unset, or the store cannot be reached.
pub async fn init() -> Result<(), CoordinationError> {
    let settings = config::settings()?;
    if settings.jwt_secret.is_none() {
        return Err(CoordinationError::Configuration("JWT_SECRET must be set".to_string()).log());
    }

    storage::init().await?;

    tracing::info!(
        origin = %settings.origin,
        rp_id = %settings.rp_id,
        "console_auth initialized"
    );
    Ok(())
}

/// The configured superuser name (`CONSOLE_SUPERUSER`).
pub fn superuser() -> Result<&'static str, CoordinationError> {
    Ok(config::settings()?.superuser.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_environment;

    #[tokio::test]
    async fn test_superuser_tokens_verify_without_directory_record() {
        init_test_environment().await;

        let name = superuser().unwrap();
        assert_eq!(name, config::settings().unwrap().superuser);
        let pair = issue_token_pair(name, Role::Superuser).unwrap();
        let user = verify_access_token_core(&pair.access_token).unwrap();
        assert_eq!(user.username, name);
        assert_eq!(user.role, Role::Superuser);
    }

    #[tokio::test]
    async fn test_init_with_test_environment() {
        init_test_environment().await;
        assert!(init().await.is_ok());
        // Idempotent
        assert!(init().await.is_ok());
    }
}
