//! Error types for the report lifecycle domain.

use thiserror::Error;
use uuid::Uuid;

use crate::types::RequestStatus;

/// Domain error for report request/response operations.
///
/// Classification helpers (`is_not_found`, `is_conflict`, ...) drive the
/// HTTP status mapping at the API boundary.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Generic input validation failure.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A response item had neither a title nor content.
    #[error("Item {0} must have a title or content")]
    EmptyItem(usize),

    /// Score outside the accepted 0-10 range.
    #[error("Score must be between 0 and 10, got {0}")]
    ScoreOutOfRange(f64),

    /// Item progress outside the accepted 0-100 range.
    #[error("Progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(i32),

    /// Request deadline was not in the future at creation time.
    #[error("Deadline must be in the future")]
    DeadlineInPast,

    /// Request targets resolve to an empty recipient set.
    #[error("Request targets resolve to no recipients")]
    NoRecipients,

    /// The request deadline has passed; submissions are closed.
    #[error("The request deadline has passed")]
    DeadlineExceeded,

    /// The response has been scored and is locked against edits.
    #[error("Response {0} has been evaluated and is locked")]
    ResponseLocked(Uuid),

    /// A self-score was already recorded for this response.
    #[error("Response {0} already has a self-evaluation")]
    SelfScoreAlreadySet(Uuid),

    /// The recipient already submitted a response for this request.
    #[error("A response for this request was already submitted")]
    ResponseAlreadySubmitted,

    /// No transition is possible out of a terminal status.
    #[error("Request is in terminal status {0} and cannot change")]
    TerminalStatus(RequestStatus),

    /// The requested status change is not allowed for a recipient.
    #[error("Status transition from {from} to {to} is not permitted")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    /// Only the request creator may perform this operation.
    #[error("Only the request creator may perform this action")]
    NotCreator,

    /// Only the response submitter may perform this operation.
    #[error("Only the response submitter may perform this action")]
    NotSubmitter,

    /// The acting user is not a recipient of the request.
    #[error("User is not a recipient of this request")]
    NotRecipient,

    /// Forwarding requires being the creator or a recipient of the source.
    #[error("Only the creator or a recipient of the source request may forward it")]
    ForwardNotPermitted,

    /// Report request not found.
    #[error("Report request not found: {0}")]
    RequestNotFound(Uuid),

    /// Report response not found.
    #[error("Report response not found: {0}")]
    ResponseNotFound(Uuid),

    /// Response item not found.
    #[error("Response item not found: {0}")]
    ItemNotFound(Uuid),

    /// User not found in the directory.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Snapshot (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File storage failure.
    #[error("File storage error: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// True when the error maps to HTTP 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RequestNotFound(_)
                | Self::ResponseNotFound(_)
                | Self::ItemNotFound(_)
                | Self::UserNotFound(_)
        )
    }

    /// True when the error maps to HTTP 409.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ResponseLocked(_)
                | Self::SelfScoreAlreadySet(_)
                | Self::ResponseAlreadySubmitted
                | Self::TerminalStatus(_)
                | Self::DeadlineExceeded
        )
    }

    /// True when the error maps to HTTP 403.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            Self::NotCreator | Self::NotSubmitter | Self::NotRecipient | Self::ForwardNotPermitted
        )
    }

    /// True when the error maps to HTTP 400.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::EmptyItem(_)
                | Self::ScoreOutOfRange(_)
                | Self::ProgressOutOfRange(_)
                | Self::DeadlineInPast
                | Self::NoRecipients
                | Self::InvalidTransition { .. }
        )
    }
}

/// Type alias for Results using [`WorkflowError`].
pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_is_disjoint() {
        let errors = [
            WorkflowError::Validation("x".into()),
            WorkflowError::DeadlineExceeded,
            WorkflowError::ResponseLocked(Uuid::new_v4()),
            WorkflowError::NotCreator,
            WorkflowError::RequestNotFound(Uuid::new_v4()),
        ];
        for e in &errors {
            let classes = [
                e.is_not_found(),
                e.is_conflict(),
                e.is_forbidden(),
                e.is_validation(),
            ];
            assert!(
                classes.iter().filter(|c| **c).count() <= 1,
                "{e} matched more than one class"
            );
        }
    }

    #[test]
    fn test_deadline_exceeded_is_conflict() {
        assert!(WorkflowError::DeadlineExceeded.is_conflict());
        assert!(!WorkflowError::DeadlineExceeded.is_validation());
    }

    #[test]
    fn test_display_messages() {
        let e = WorkflowError::ScoreOutOfRange(11.5);
        assert_eq!(e.to_string(), "Score must be between 0 and 10, got 11.5");

        let e = WorkflowError::EmptyItem(2);
        assert_eq!(e.to_string(), "Item 2 must have a title or content");
    }
}
