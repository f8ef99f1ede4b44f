use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use darzi_core::DarziError;
use serde_json::json;

/// A request-level failure rendered as the standard
/// `{"status":"fail","message":...}` envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "fail",
            "message": self.message,
        });
        (self.status, axum::Json(body)).into_response()
    }
}

impl From<DarziError> for ApiError {
    fn from(err: DarziError) -> Self {
        match &err {
            DarziError::Storage(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
            ),
            DarziError::Crypto(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
            ),
            DarziError::Auth(_) => ApiError::new(StatusCode::UNAUTHORIZED, err.to_string()),
            DarziError::Forbidden(_) => ApiError::new(StatusCode::FORBIDDEN, err.to_string()),
            DarziError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            DarziError::InvalidRequest(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            DarziError::AccountNotFound => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            DarziError::ProfileNotFound => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            DarziError::ProductNotFound => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            DarziError::EmailAlreadyRegistered => {
                ApiError::new(StatusCode::CONFLICT, err.to_string())
            }
            DarziError::DuplicateProfileName => {
                ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            DarziError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            DarziError::RefreshTokenMissing => {
                ApiError::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            DarziError::RefreshTokenInvalid => {
                ApiError::new(StatusCode::FORBIDDEN, err.to_string())
            }
            DarziError::EmptyOrder => ApiError::new(StatusCode::BAD_REQUEST, err.to_string()),
            DarziError::InternalError(_) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
            ),
        }
    }
}
