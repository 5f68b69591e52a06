//! Error handling for the AgriLens server
//!
//! Every error renders as `{message, code, field?}`. The credential routes
//! rely on `message` carrying the exact user-facing text.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserExists,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // External service errors
    #[error("Inference service error: {0}")]
    InferenceError(String),

    #[error("Assistant service error: {0}")]
    AssistantError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.to_string(),
            field: None,
        }
    }
}

impl From<shared::ValidationError> for AppError {
    fn from(e: shared::ValidationError) -> Self {
        AppError::Validation {
            field: e.field.to_string(),
            message: e.message,
        }
    }
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::UserExists | AppError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InferenceError(_) | AppError::AssistantError(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            AppError::InvalidCredentials => {
                ErrorResponse::new("INVALID_CREDENTIALS", "Invalid credentials")
            }
            AppError::UserExists => ErrorResponse::new("USER_EXISTS", "User already exists"),
            AppError::Unauthorized(msg) => ErrorResponse::new("UNAUTHORIZED", msg.clone()),
            AppError::Validation { field, message } => ErrorResponse {
                message: message.clone(),
                code: "VALIDATION_ERROR".to_string(),
                field: Some(field.clone()),
            },
            AppError::NotFound(resource) => {
                ErrorResponse::new("NOT_FOUND", format!("{} not found", resource))
            }
            AppError::InferenceError(msg) => {
                ErrorResponse::new("INFERENCE_ERROR", format!("Analysis failed: {}", msg))
            }
            AppError::AssistantError(msg) => {
                ErrorResponse::new("ASSISTANT_ERROR", format!("Assistant unavailable: {}", msg))
            }
            AppError::Configuration(msg) => ErrorResponse::new("CONFIGURATION_ERROR", msg.clone()),
            AppError::DatabaseError(_) => {
                ErrorResponse::new("DATABASE_ERROR", "A database error occurred")
            }
            AppError::Internal(_) => {
                ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_keep_their_message() {
        assert_eq!(AppError::UserExists.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::UserExists.body().message, "User already exists");
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.body().message, "Invalid credentials");
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = AppError::Internal("bcrypt exploded".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.body().message.contains("bcrypt"));
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: AppError = shared::ValidationError::new("rainfall", "Rainfall must be between 0 and 3000").into();
        let body = err.body();
        assert_eq!(body.field.as_deref(), Some("rainfall"));
        assert_eq!(body.code, "VALIDATION_ERROR");
    }

    #[test]
    fn test_upstream_failures_are_bad_gateway() {
        assert_eq!(AppError::InferenceError("API returned 500".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::Configuration("no key".into()).status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
