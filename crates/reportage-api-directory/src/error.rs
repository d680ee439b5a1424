//! API error types for directory endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client handling.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// Directory API error type.
#[derive(Debug, Error)]
pub enum ApiDirectoryError {
    /// Request body validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication required.
    #[error("Authentication required")]
    Unauthorized,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Duplicate resource (unique constraint).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error")]
    Database(sqlx::Error),
}

impl From<validator::ValidationErrors> for ApiDirectoryError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for ApiDirectoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict("A record with this value already exists".to_string());
            }
            if db_err.is_foreign_key_violation() {
                return Self::Conflict(
                    "The record is referenced by other data and cannot be changed".to_string(),
                );
            }
        }
        Self::Database(err)
    }
}

impl From<reportage_workflow::WorkflowError> for ApiDirectoryError {
    fn from(err: reportage_workflow::WorkflowError) -> Self {
        match err {
            reportage_workflow::WorkflowError::Database(e) => Self::Database(e),
            e if e.is_not_found() => Self::NotFound(e.to_string()),
            e => Self::Validation(e.to_string()),
        }
    }
}

impl IntoResponse for ApiDirectoryError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            Self::Database(e) => {
                tracing::error!("Database error in directory API: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });
        (status, body).into_response()
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiDirectoryError>;
