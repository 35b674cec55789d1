//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A speed test was submitted for a session that never generated an id.
    #[error("No test id for session: {0}")]
    NoTestId(String),

    /// Deployment misconfiguration, such as degenerate map bounds.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// Field-level validation error
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    /// HTTP status and numeric error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, u16) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, 10001),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, 10002),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, 10007),
            AppError::NoTestId(_) => (StatusCode::BAD_REQUEST, 10008),
            AppError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, 10009),
            AppError::Configuration(_) | AppError::Internal(_) | AppError::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, 10000)
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let reason = match &rejection {
            JsonRejection::JsonDataError(_) => "Invalid data format",
            JsonRejection::JsonSyntaxError(_) => "Malformed JSON body",
            JsonRejection::MissingJsonContentType(_) => "Expected a JSON body",
            _ => "Unreadable request body",
        };
        tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
        AppError::BadRequest(reason.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Validation(msg)
            | AppError::NoTestId(msg)
            | AppError::ServiceUnavailable(msg) => msg.clone(),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "Server misconfigured".into()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".into()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".into()
            }
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}
