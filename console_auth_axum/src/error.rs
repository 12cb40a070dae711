use axum::Json;
use axum::extract::rejection::JsonRejection;
use console_auth::CoordinationError;
use http::StatusCode;
use serde::Serialize;

/// Body of every failed response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Status code and JSON body returned by a failed handler.
pub type ErrorResponse = (StatusCode, Json<ErrorBody>);

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: message.into(),
        }),
    )
}

/// Map a coordination error onto its status code.
pub fn status_for(err: &CoordinationError) -> StatusCode {
    match err {
        CoordinationError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CoordinationError::Validation(_) => StatusCode::BAD_REQUEST,
        CoordinationError::Authentication(_) => StatusCode::UNAUTHORIZED,
        CoordinationError::NotFound(_) => StatusCode::NOT_FOUND,
        CoordinationError::Verification => StatusCode::BAD_REQUEST,
    }
}

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, ErrorResponse>;
}

impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        self.map_err(|e| error_response(status_for(&e), e.to_string()))
    }
}

/// A body axum could not parse is a malformed request like any other.
impl<T> IntoResponseError<T> for Result<Json<T>, JsonRejection> {
    fn into_response_error(self) -> Result<T, ErrorResponse> {
        match self {
            Ok(Json(body)) => Ok(body),
            Err(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "Invalid request: malformed body",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoordinationError) -> StatusCode {
        let result: Result<(), CoordinationError> = Err(err);
        result.into_response_error().unwrap_err().0
    }

    #[test]
    fn test_coordination_error_statuses() {
        assert_eq!(
            status_of(CoordinationError::Configuration("no store".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(CoordinationError::Validation("username".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoordinationError::Authentication("revoked".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(CoordinationError::NotFound("credential".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoordinationError::Verification),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_body_is_coarse() {
        let result: Result<(), CoordinationError> = Err(CoordinationError::Configuration(
            "redis://10.0.0.3:6379 refused".to_string(),
        ));
        let (_, Json(body)) = result.into_response_error().unwrap_err();
        assert!(!body.success);
        assert_eq!(body.error, "Service is not configured");
    }

    #[test]
    fn test_success_case() {
        let result: Result<String, CoordinationError> = Ok("Success".to_string());
        assert_eq!(result.into_response_error().unwrap(), "Success");
    }
}
