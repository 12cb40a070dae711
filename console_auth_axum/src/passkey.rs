use axum::{
    extract::{Json, Path, rejection::JsonRejection},
    routing::{Router, delete, get, post},
};
use serde::Serialize;
use serde_json::{Value, json};

use console_auth::{
    AuthenticationOptions, AuthenticationStartRequest, AuthenticatorResponse, CredentialView,
    LoginResponse, RegisterCredential, RegistrationOptions, delete_passkey_credential_core,
    handle_finish_authentication_core, handle_finish_registration_core,
    handle_start_authentication_core, handle_start_registration_core, list_credentials_core,
};

use crate::error::{ErrorResponse, IntoResponseError};
use crate::session::AuthUser;

/// Successful response: the payload's fields next to `"success": true`
#[derive(Debug, Serialize)]
pub(crate) struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

pub(crate) fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        body,
    })
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialList {
    credentials: Vec<CredentialView>,
}

pub fn router() -> Router {
    Router::new()
        .nest("/auth", router_auth())
        .nest("/register", router_register())
        .route("/credentials", get(list_passkey_credentials))
        .route(
            "/credentials/{credential_id}",
            delete(delete_passkey_credential),
        )
}

pub fn router_register() -> Router {
    Router::new()
        .route("/start", post(handle_start_registration))
        .route("/finish", post(handle_finish_registration))
}

pub fn router_auth() -> Router {
    Router::new()
        .route("/start", post(handle_start_authentication))
        .route("/finish", post(handle_finish_authentication))
}

pub(crate) async fn handle_start_registration(
    auth_user: AuthUser,
) -> Result<Json<Success<RegistrationOptions>>, ErrorResponse> {
    let options = handle_start_registration_core(&auth_user)
        .await
        .into_response_error()?;
    Ok(success(options))
}

pub(crate) async fn handle_finish_registration(
    auth_user: AuthUser,
    body: Result<Json<RegisterCredential>, JsonRejection>,
) -> Result<Json<Success<CredentialView>>, ErrorResponse> {
    let reg_data = body.into_response_error()?;
    let view = handle_finish_registration_core(&auth_user, reg_data)
        .await
        .into_response_error()?;
    Ok(success(view))
}

pub(crate) async fn handle_start_authentication(
    body: Result<Json<AuthenticationStartRequest>, JsonRejection>,
) -> Result<Json<Success<AuthenticationOptions>>, ErrorResponse> {
    let request = body.into_response_error()?;
    let options = handle_start_authentication_core(request)
        .await
        .into_response_error()?;
    Ok(success(options))
}

pub(crate) async fn handle_finish_authentication(
    body: Result<Json<AuthenticatorResponse>, JsonRejection>,
) -> Result<Json<Success<LoginResponse>>, ErrorResponse> {
    let auth_response = body.into_response_error()?;
    let login = handle_finish_authentication_core(auth_response)
        .await
        .into_response_error()?;
    Ok(success(login))
}

pub(crate) async fn list_passkey_credentials(
    auth_user: AuthUser,
) -> Result<Json<Success<CredentialList>>, ErrorResponse> {
    let credentials = list_credentials_core(&auth_user)
        .await
        .into_response_error()?;
    Ok(success(CredentialList { credentials }))
}

pub(crate) async fn delete_passkey_credential(
    auth_user: AuthUser,
    Path(credential_id): Path<String>,
) -> Result<Json<Value>, ErrorResponse> {
    delete_passkey_credential_core(&auth_user, &credential_id)
        .await
        .into_response_error()?;
    Ok(Json(json!({ "success": true })))
}
