use std::ops::Deref;

use axum::{
    RequestPartsExt,
    extract::{FromRequestParts, OptionalFromRequestParts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use http::{StatusCode, request::Parts};

use console_auth::{AuthenticatedUser, verify_access_token_core};

use crate::error::{ErrorResponse, IntoResponseError, error_response};

/// Caller identity from an `Authorization: Bearer <access token>` header
///
/// Rejects with `401` and a JSON error body when the header is missing or the
/// token is not a valid, unexpired access token. Refresh tokens are refused.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use console_auth_axum::AuthUser;
///
/// async fn whoami(user: AuthUser) -> String {
///     format!("{} ({})", user.username, user.role)
/// }
///
/// let app: Router = Router::new().route("/whoami", get(whoami));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser(AuthenticatedUser);

impl Deref for AuthUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                tracing::debug!("Missing or malformed bearer credential");
                error_response(StatusCode::UNAUTHORIZED, "Authentication failed")
            })?;

        let user = verify_access_token_core(bearer.token()).into_response_error()?;
        Ok(Self(user))
    }
}

impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(user) => Ok(Some(user)),
            Err(_) => Ok(None),
        }
    }
}
