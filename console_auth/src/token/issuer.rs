use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::config::settings;
use crate::userdb::{Role, UserDirectory};

use super::errors::TokenError;
use super::revocation::RevocationLedger;
use super::types::{RefreshOutcome, TokenClaims, TokenPair, TokenType};

/// Access tokens are short-lived and never persisted.
pub(crate) const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

/// Mints and verifies the console's HS256 tokens.
pub struct TokenIssuer;

impl TokenIssuer {
    pub fn issue_access_token(username: &str, role: Role) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: expiry_after(now, Duration::minutes(ACCESS_TOKEN_TTL_MINUTES))?,
            token_type: TokenType::Access,
            jti: None,
        };
        sign(&claims)
    }

    pub fn issue_refresh_token(username: &str, role: Role) -> Result<String, TokenError> {
        let ttl_days = settings()?.refresh_token_ttl_days;
        let now = Utc::now();
        let claims = TokenClaims {
            sub: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: expiry_after(now, Duration::try_days(ttl_days).unwrap_or(Duration::MAX))?,
            token_type: TokenType::Refresh,
            jti: Some(uuid::Uuid::new_v4().to_string()),
        };
        sign(&claims)
    }

    pub fn issue_token_pair(username: &str, role: Role) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: Self::issue_access_token(username, role)?,
            refresh_token: Self::issue_refresh_token(username, role)?,
        })
    }

    /// Check signature and expiry. Every failure reports the same error.
    pub fn verify(token: &str) -> Result<TokenClaims, TokenError> {
        let secret = signing_secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        jsonwebtoken::decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            TokenError::Invalid
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself is not rotated.
    #[tracing::instrument(skip(refresh_token))]
    pub async fn refresh(refresh_token: &str) -> Result<RefreshOutcome, TokenError> {
        let claims = Self::verify(refresh_token)?;
        let jti = refresh_claims_id(&claims)?;

        if RevocationLedger::is_revoked(jti).await? {
            tracing::info!(sub = %claims.sub, "Refresh attempted with revoked token");
            return Err(TokenError::Revoked);
        }

        let accounts = if claims.role == Role::Superuser && is_superuser(&claims.sub)? {
            Vec::new()
        } else {
            match UserDirectory::get_user(&claims.sub).await? {
                Some(user) if user.is_active() => user.accounts,
                _ => return Err(TokenError::UserInactive(claims.sub)),
            }
        };

        let access_token = Self::issue_access_token(&claims.sub, claims.role)?;
        tracing::debug!(sub = %claims.sub, "Access token refreshed");

        Ok(RefreshOutcome {
            access_token,
            accounts,
        })
    }

    /// Invalidate a refresh token for the rest of its lifetime.
    #[tracing::instrument(skip(refresh_token))]
    pub async fn revoke(refresh_token: &str) -> Result<(), TokenError> {
        let claims = Self::verify(refresh_token)?;
        let jti = refresh_claims_id(&claims)?;

        RevocationLedger::revoke(jti, claims.exp).await?;
        Ok(())
    }
}

fn refresh_claims_id(claims: &TokenClaims) -> Result<&str, TokenError> {
    if claims.token_type != TokenType::Refresh {
        return Err(TokenError::WrongType);
    }
    claims.jti.as_deref().ok_or(TokenError::Invalid)
}

fn is_superuser(username: &str) -> Result<bool, TokenError> {
    Ok(settings()?.superuser == username)
}

fn signing_secret() -> Result<&'static str, TokenError> {
    settings()?
        .jwt_secret
        .as_deref()
        .ok_or_else(|| TokenError::Config("JWT_SECRET is not set".to_string()))
}

pub(crate) fn sign(claims: &TokenClaims) -> Result<String, TokenError> {
    let secret = signing_secret()?;
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Config(format!("Failed to sign token: {e}")))
}

fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Result<i64, TokenError> {
    now.checked_add_signed(ttl)
        .map(|exp| exp.timestamp())
        .ok_or_else(|| TokenError::Config(format!("token lifetime {ttl} is out of range")))
}
