use serde::{Deserialize, Serialize};

use crate::token::{RefreshOutcome, TokenIssuer, TokenPair, TokenType};
use crate::userdb::Role;

use super::errors::CoordinationError;

/// Identity carried by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub username: String,
    pub role: Role,
}

/// Body of `POST /token/refresh` and `POST /token/revoke`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl RefreshTokenRequest {
    fn token(&self) -> Result<&str, CoordinationError> {
        self.refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CoordinationError::Validation("refresh_token is required".to_string()).log()
            })
    }
}

/// Resolve a bearer credential. Only unexpired access tokens are accepted.
pub fn verify_access_token_core(token: &str) -> Result<AuthenticatedUser, CoordinationError> {
    let claims = TokenIssuer::verify(token).map_err(CoordinationError::from_token_exchange)?;

    if claims.token_type != TokenType::Access {
        tracing::debug!(sub = %claims.sub, "Non-access token presented as bearer credential");
        return Err(CoordinationError::Authentication(
            "Bearer credential is not an access token".to_string(),
        ));
    }

    Ok(AuthenticatedUser {
        username: claims.sub,
        role: claims.role,
    })
}

/// Exchange a refresh token for a new access token.
pub async fn refresh_token_core(
    body: RefreshTokenRequest,
) -> Result<RefreshOutcome, CoordinationError> {
    let token = body.token()?;
    TokenIssuer::refresh(token)
        .await
        .map_err(CoordinationError::from_token_exchange)
}

/// Logout: block the refresh token for the rest of its lifetime.
pub async fn revoke_token_core(body: RefreshTokenRequest) -> Result<(), CoordinationError> {
    let token = body.token()?;
    TokenIssuer::revoke(token)
        .await
        .map_err(CoordinationError::from_token_exchange)
}

/// Token pair for a user the host application has authenticated by other means.
pub fn issue_token_pair(username: &str, role: Role) -> Result<TokenPair, CoordinationError> {
    Ok(TokenIssuer::issue_token_pair(username, role)?)
}
