use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::utils::jwt::JwtError;

/// Errors rendered to callers as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),
    /// A failure reported by an upstream provider, surfaced with its status.
    #[error("Upstream Error ({status}): {message}")]
    Upstream { status: u16, message: String },
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn internal() -> Self {
        AppError::InternalServerError("Internal Server Error".to_string())
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::InternalServerError(msg) => msg,
            AppError::Upstream { message, .. } => message,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.message().to_string(),
        })
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AppError::Unauthorized("Expired token".to_string()),
            JwtError::Invalid(_) => AppError::Unauthorized("Invalid token".to_string()),
            JwtError::KeySetStatus(status) => AppError::Upstream {
                status,
                message: "Failed to fetch JWKS".to_string(),
            },
            JwtError::KeySetUnavailable(_) => {
                AppError::InternalServerError("Failed to fetch JWKS".to_string())
            }
        }
    }
}

/// Failures from the profile or photo backends. Never shown to callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("backend request failed: {0}")]
    Backend(String),
    #[error("stored record is missing attribute {0}")]
    Malformed(&'static str),
}
