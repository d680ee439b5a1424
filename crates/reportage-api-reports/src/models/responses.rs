//! Request and response models for report response endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use reportage_workflow::{
    derived_status, DerivedStatus, NewResponseItem, ReportResponse, ResponseComment,
    ResponseHistoryEntry, ResponseItem,
};

/// One item of a submit/update call.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ResponseItemRequest {
    /// Item title; title or content must be non-blank.
    #[validate(length(max = 500, message = "Item title must not exceed 500 characters"))]
    pub title: Option<String>,

    /// Item content; title or content must be non-blank.
    pub content: Option<String>,

    /// Completion percentage (0-100).
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: Option<i32>,

    /// Free-text difficulties encountered.
    pub difficulties: Option<String>,

    /// Presentation order; defaults to list position.
    pub display_order: Option<i32>,
}

impl From<ResponseItemRequest> for NewResponseItem {
    fn from(item: ResponseItemRequest) -> Self {
        Self {
            title: item.title,
            content: item.content,
            progress: item.progress,
            difficulties: item.difficulties,
            display_order: item.display_order,
        }
    }
}

/// Request body for submitting or updating a response.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitResponseRequest {
    /// Overall note accompanying the items.
    #[validate(length(max = 4000, message = "Note must not exceed 4000 characters"))]
    pub note: Option<String>,

    /// Ordered item batch.
    #[validate(nested)]
    pub items: Vec<ResponseItemRequest>,
}

/// Request body for evaluating a response.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EvaluateRequest {
    /// Score between 0 and 10.
    #[validate(range(min = 0.0, max = 10.0, message = "Score must be between 0 and 10"))]
    pub score: f64,

    /// Optional evaluator comment.
    #[validate(length(max = 2000, message = "Comment must not exceed 2000 characters"))]
    pub comment: Option<String>,
}

/// Request body for sending a response back for revision.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendBackRequest {
    /// Mandatory feedback for the submitter.
    #[validate(length(
        min = 1,
        max = 2000,
        message = "A comment is required (1-2000 characters)"
    ))]
    pub comment: String,
}

/// Request body for self-evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SelfEvaluateRequest {
    /// Self-assessed score between 0 and 10.
    #[validate(range(min = 0.0, max = 10.0, message = "Score must be between 0 and 10"))]
    pub score: f64,
}

/// A response item as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResponseItemDto {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub progress: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulties: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    pub display_order: i32,
}

impl From<ResponseItem> for ResponseItemDto {
    fn from(item: ResponseItem) -> Self {
        let (file_name, file_path, file_type, file_size) = match item.attachment {
            Some(attachment) => (
                Some(attachment.file_name),
                Some(attachment.file_path),
                attachment.file_type,
                Some(attachment.file_size),
            ),
            None => (None, None, None, None),
        };
        Self {
            id: item.id,
            title: item.title,
            content: item.content,
            progress: item.progress,
            difficulties: item.difficulties,
            file_name,
            file_path,
            file_type,
            file_size,
            display_order: item.display_order,
        }
    }
}

/// A report response as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub report_request_id: Uuid,
    pub submitted_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub items: Vec<ResponseItemDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluated_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_evaluated_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Derived per-recipient status of this response.
    #[schema(value_type = String)]
    pub derived_status: DerivedStatus,
}

impl From<ReportResponse> for ReportResponseDto {
    fn from(response: ReportResponse) -> Self {
        let status = derived_status(Some(&response));
        Self {
            id: response.id,
            report_request_id: response.report_request_id,
            submitted_by: response.submitted_by,
            note: response.note,
            items: response.items.into_iter().map(Into::into).collect(),
            score: response.score,
            self_score: response.self_score,
            comment: response.comment,
            evaluated_by: response.evaluated_by,
            evaluated_at: response.evaluated_at,
            self_evaluated_at: response.self_evaluated_at,
            submitted_at: response.submitted_at,
            updated_at: response.updated_at,
            derived_status: status,
        }
    }
}

/// One entry of a response's edit history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResponseHistoryDto {
    pub id: Uuid,
    pub version: i32,
    pub edited_by: Uuid,
    pub edited_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub items: Vec<ResponseItemDto>,
}

impl From<ResponseHistoryEntry> for ResponseHistoryDto {
    fn from(entry: ResponseHistoryEntry) -> Self {
        Self {
            id: entry.id,
            version: entry.version,
            edited_by: entry.edited_by,
            edited_at: entry.edited_at,
            note: entry.snapshot.note,
            items: entry.snapshot.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// One entry of a response's evaluation comment log.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResponseCommentDto {
    pub id: Uuid,
    pub commented_by: Uuid,
    pub commented_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub is_final_evaluation: bool,
}

impl From<ResponseComment> for ResponseCommentDto {
    fn from(comment: ResponseComment) -> Self {
        Self {
            id: comment.id,
            commented_by: comment.commented_by,
            commented_at: comment.commented_at,
            comment: comment.comment,
            score: comment.score,
            is_final_evaluation: comment.is_final_evaluation,
        }
    }
}
