//! JSON error responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use funprofile_core::storage::StorageError;
use funprofile_shared::{AppError, JwtError};
use serde_json::json;

/// An [`AppError`] rendered as `{ "error": message, "code": code }`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": self.0.message(),
            "code": self.0.error_code(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let app = match &err {
            StorageError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            StorageError::InvalidMimeType { .. } | StorageError::InvalidKey(_) => {
                AppError::Validation(err.to_string())
            }
            StorageError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StorageError::PresignNotSupported | StorageError::Configuration(_) => {
                AppError::ServiceUnavailable("object storage is not available".to_string())
            }
            StorageError::Operation(_) => {
                AppError::ExternalService("storage operation failed".to_string())
            }
        };
        Self(app)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        let message = match err {
            JwtError::Expired => "Token has expired",
            JwtError::InvalidAudience => "Token audience is not accepted",
            JwtError::EncodingError(_) | JwtError::DecodingError(_) => {
                "Invalid or malformed token"
            }
        };
        Self(AppError::Unauthorized(message.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::Validation(rejection.body_text()))
    }
}
