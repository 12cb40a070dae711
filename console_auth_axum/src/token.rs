use axum::{
    extract::{Json, rejection::JsonRejection},
    routing::{Router, post},
};
use serde_json::{Value, json};

use console_auth::{RefreshOutcome, RefreshTokenRequest, refresh_token_core, revoke_token_core};

use crate::error::{ErrorResponse, IntoResponseError};
use crate::passkey::{Success, success};

pub fn router() -> Router {
    Router::new()
        .route("/refresh", post(handle_refresh))
        .route("/revoke", post(handle_revoke))
}

pub(crate) async fn handle_refresh(
    body: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<Success<RefreshOutcome>>, ErrorResponse> {
    let request = body.into_response_error()?;
    let outcome = refresh_token_core(request).await.into_response_error()?;
    Ok(success(outcome))
}

/// Logout
pub(crate) async fn handle_revoke(
    body: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<Json<Value>, ErrorResponse> {
    let request = body.into_response_error()?;
    revoke_token_core(request).await.into_response_error()?;
    Ok(Json(json!({ "success": true })))
}
