//! API error types for report endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use reportage_workflow::WorkflowError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client handling.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// Report API error type.
#[derive(Debug, Error)]
pub enum ApiReportsError {
    /// Domain error from the workflow crate.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Request body validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication required.
    #[error("Authentication required")]
    Unauthorized,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// File storage failure.
    #[error("File storage error: {0}")]
    Storage(String),

    /// Database error.
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for ApiReportsError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Error code string for a workflow error, used by clients to branch.
fn workflow_error_code(err: &WorkflowError) -> &'static str {
    match err {
        WorkflowError::DeadlineExceeded => "deadline_exceeded",
        WorkflowError::ResponseLocked(_) => "response_locked",
        WorkflowError::SelfScoreAlreadySet(_) => "self_evaluation_conflict",
        WorkflowError::ResponseAlreadySubmitted => "response_exists",
        WorkflowError::TerminalStatus(_) => "terminal_status",
        e if e.is_validation() => "validation_error",
        e if e.is_forbidden() => "forbidden",
        e if e.is_not_found() => "not_found",
        _ => "internal_error",
    }
}

impl IntoResponse for ApiReportsError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Self::Workflow(e) => {
                let code = workflow_error_code(e);
                if e.is_validation() {
                    (StatusCode::BAD_REQUEST, code, e.to_string())
                } else if e.is_forbidden() {
                    (StatusCode::FORBIDDEN, code, e.to_string())
                } else if e.is_not_found() {
                    (StatusCode::NOT_FOUND, code, e.to_string())
                } else if e.is_conflict() {
                    (StatusCode::CONFLICT, code, e.to_string())
                } else {
                    tracing::error!("Unhandled workflow error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "An internal error occurred".to_string(),
                    )
                }
            }
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::Storage(msg) => {
                tracing::error!("File storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "File storage error".to_string(),
                )
            }
            Self::Database(e) => {
                tracing::error!("Database error in reports API: {:?}", e);
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
pub type ApiResult<T> = std::result::Result<T, ApiReportsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: ApiReportsError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_workflow_error_mapping() {
        assert_eq!(
            status_of(WorkflowError::DeadlineExceeded.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(WorkflowError::ResponseLocked(Uuid::new_v4()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(WorkflowError::NotCreator.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(WorkflowError::RequestNotFound(Uuid::new_v4()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(WorkflowError::ScoreOutOfRange(11.0).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            workflow_error_code(&WorkflowError::DeadlineExceeded),
            "deadline_exceeded"
        );
        assert_eq!(
            workflow_error_code(&WorkflowError::SelfScoreAlreadySet(Uuid::new_v4())),
            "self_evaluation_conflict"
        );
        assert_eq!(
            workflow_error_code(&WorkflowError::NotRecipient),
            "forbidden"
        );
    }
}
