use serde::{Deserialize, Serialize};

use crate::config::settings;
use crate::passkey::{
    AuthenticationOptions, AuthenticatorResponse, CredentialRegistry, CredentialView,
    RegisterCredential, RegistrationOptions, finish_authentication, finish_registration,
    start_authentication, start_registration,
};
use crate::token::TokenIssuer;
use crate::userdb::{Role, UserDirectory};

use super::errors::CoordinationError;
use super::token::AuthenticatedUser;

/// Body of `POST /passkey/auth/start`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthenticationStartRequest {
    #[serde(default)]
    pub username: Option<String>,
}

/// Tokens and identity returned by a successful passkey login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub role: Role,
    pub access_token: String,
    pub refresh_token: String,
}

/// Registration options for the caller, excluding credentials they already hold.
pub async fn handle_start_registration_core(
    auth_user: &AuthenticatedUser,
) -> Result<RegistrationOptions, CoordinationError> {
    tracing::trace!(username = %auth_user.username, "handle_start_registration_core");
    Ok(start_registration(&auth_user.username).await?)
}

/// Verify a creation response and register the credential to the caller.
pub async fn handle_finish_registration_core(
    auth_user: &AuthenticatedUser,
    reg_data: RegisterCredential,
) -> Result<CredentialView, CoordinationError> {
    finish_registration(&auth_user.username, &reg_data)
        .await
        .map_err(CoordinationError::from_ceremony)
}

/// Request options for a login. No caller identity is needed.
pub async fn handle_start_authentication_core(
    body: AuthenticationStartRequest,
) -> Result<AuthenticationOptions, CoordinationError> {
    let username = body
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CoordinationError::Validation("username is required".to_string()).log())?;

    Ok(start_authentication(username).await?)
}

/// Verify an assertion, resolve the user's role and issue a token pair.
pub async fn handle_finish_authentication_core(
    auth_response: AuthenticatorResponse,
) -> Result<LoginResponse, CoordinationError> {
    let username = finish_authentication(&auth_response)
        .await
        .map_err(CoordinationError::from_ceremony)?;

    let role = resolve_login_role(&username).await?;
    let pair = TokenIssuer::issue_token_pair(&username, role)?;

    tracing::info!(%username, %role, "Passkey login succeeded");
    Ok(LoginResponse {
        username,
        role,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    })
}

/// The caller's registered passkeys, without key material.
pub async fn list_credentials_core(
    auth_user: &AuthenticatedUser,
) -> Result<Vec<CredentialView>, CoordinationError> {
    Ok(CredentialRegistry::list(&auth_user.username).await?)
}

pub async fn delete_passkey_credential_core(
    auth_user: &AuthenticatedUser,
    credential_id: &str,
) -> Result<(), CoordinationError> {
    if !CredentialRegistry::remove(&auth_user.username, credential_id).await? {
        return Err(CoordinationError::NotFound("Credential not found".to_string()).log());
    }

    tracing::info!(username = %auth_user.username, credential = credential_id, "Passkey deleted");
    Ok(())
}

/// The configured superuser needs no directory record. Everyone else must be
/// active; a missing or pending user fails like any other ceremony failure.
async fn resolve_login_role(username: &str) -> Result<Role, CoordinationError> {
    if settings()?.superuser == username {
        return Ok(Role::Superuser);
    }

    match UserDirectory::get_user(username).await? {
        Some(user) if user.is_active() => Ok(user.role),
        Some(_) => {
            tracing::warn!(username, "Login by pending user refused");
            Err(CoordinationError::Verification)
        }
        None => {
            tracing::warn!(username, "Login by unknown user refused");
            Err(CoordinationError::Verification)
        }
    }
}
