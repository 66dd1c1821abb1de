use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clinic_application::AUTHENTICATION_REQUIRED;
use clinic_core::AppError;
use tracing::error;

mod types;

pub use types::ErrorResponse;

pub const CLINIC_CONTEXT_REQUIRED: &str = "Clinic context required";
pub const PERMISSION_DENIED: &str = "Permission denied";

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match self.0 {
            AppError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(AUTHENTICATION_REQUIRED.to_owned()),
            ),
            AppError::ClinicContextRequired => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(CLINIC_CONTEXT_REQUIRED.to_owned()),
            ),
            AppError::PermissionDenied { required } => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new(PERMISSION_DENIED.to_owned()).with_required(required),
            ),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, ErrorResponse::new(message)),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, ErrorResponse::new(message)),
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(message))
            }
            AppError::Conflict(message) => (StatusCode::CONFLICT, ErrorResponse::new(message)),
            AppError::Internal(message) => {
                error!(error = %message, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error".to_owned()),
                )
            }
        };

        (status, Json(payload)).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
