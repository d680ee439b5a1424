//! Request and response models for report request endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use reportage_db::models::ReportRequestAttachmentRow;
use reportage_workflow::{
    DerivedStatus, ReportRequest, RequestHistoryEntry, RequestRollup, RequestStatus,
};

/// Request to create a report request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportRequestRequest {
    /// Title shown to recipients.
    #[validate(length(min = 1, max = 500, message = "Title is required (1-500 characters)"))]
    pub title: String,

    /// Optional longer description.
    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,

    /// Submission deadline; must be in the future.
    pub deadline: DateTime<Utc>,

    /// Target organization ids.
    #[serde(default)]
    pub organization_ids: Vec<Uuid>,

    /// Target department ids.
    #[serde(default)]
    pub department_ids: Vec<Uuid>,

    /// Target user ids.
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
}

/// Request to edit a report request's mutable fields.
pub type UpdateReportRequestRequest = CreateReportRequestRequest;

/// Request to change a report request's status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// The new status.
    #[schema(value_type = String)]
    pub status: RequestStatus,
}

/// Request to forward a report request to new recipients.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ForwardReportRequestRequest {
    /// Title for the forwarded request.
    #[validate(length(min = 1, max = 500, message = "Title is required (1-500 characters)"))]
    pub title: String,

    /// Optional note recorded for provenance and appended to the
    /// description.
    #[validate(length(max = 2000, message = "Forward note must not exceed 2000 characters"))]
    pub forward_note: Option<String>,

    /// Deadline for the forwarded request.
    pub deadline: DateTime<Utc>,

    /// Recipient user ids.
    #[validate(length(min = 1, message = "At least one recipient is required"))]
    pub user_ids: Vec<Uuid>,
}

/// Query parameters for the administrative request listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListRequestsQuery {
    /// Case-insensitive search over title and description.
    pub search: Option<String>,
    /// Filter by status.
    #[param(value_type = Option<String>)]
    pub status: Option<RequestStatus>,
    /// Filter by creator.
    pub created_by: Option<Uuid>,
    /// Filter to requests with a response from this user.
    pub submitted_by: Option<Uuid>,
    /// Filter by target organization.
    pub organization_id: Option<Uuid>,
    /// Filter by target department.
    pub department_id: Option<Uuid>,
}

/// Query parameters for file uploads.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UploadQuery {
    /// Original file name.
    pub file_name: String,
    /// MIME type reported by the client.
    pub content_type: Option<String>,
}

/// A report request as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportRequestResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    #[schema(value_type = String)]
    pub status: RequestStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded_from: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_note: Option<String>,
    pub organization_ids: Vec<Uuid>,
    pub department_ids: Vec<Uuid>,
    pub user_ids: Vec<Uuid>,

    /// Recipients with no response yet.
    pub pending_count: usize,
    /// Recipients who submitted but are unscored.
    pub submitted_count: usize,
    /// Recipients whose response has been scored.
    pub completed_count: usize,
    /// User ids with scored responses.
    pub completed_user_ids: Vec<Uuid>,

    /// The acting user's derived status, present on "received" listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub my_response_status: Option<DerivedStatus>,
}

impl ReportRequestResponse {
    /// Build the DTO from the domain entity and its rollup.
    #[must_use]
    pub fn from_request(request: ReportRequest, rollup: RequestRollup) -> Self {
        Self {
            id: request.id,
            title: request.title,
            description: request.description,
            deadline: request.deadline,
            status: request.status,
            created_by: request.created_by,
            created_at: request.created_at,
            updated_at: request.updated_at,
            forwarded_from: request.forwarded_from,
            forward_note: request.forward_note,
            organization_ids: request.target_organizations,
            department_ids: request.target_departments,
            user_ids: request.target_users,
            pending_count: rollup.pending_count,
            submitted_count: rollup.submitted_count,
            completed_count: rollup.completed_count,
            completed_user_ids: rollup.completed_user_ids,
            my_response_status: None,
        }
    }

    /// Attach the acting user's derived status.
    #[must_use]
    pub fn with_my_status(mut self, status: DerivedStatus) -> Self {
        self.my_response_status = Some(status);
        self
    }
}

/// One entry of a request's edit history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestHistoryResponse {
    pub id: Uuid,
    pub version: i32,
    pub edited_by: Uuid,
    pub edited_at: DateTime<Utc>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub organization_ids: Vec<Uuid>,
    pub department_ids: Vec<Uuid>,
    pub user_ids: Vec<Uuid>,
}

impl From<RequestHistoryEntry> for RequestHistoryResponse {
    fn from(entry: RequestHistoryEntry) -> Self {
        Self {
            id: entry.id,
            version: entry.version,
            edited_by: entry.edited_by,
            edited_at: entry.edited_at,
            title: entry.snapshot.title,
            description: entry.snapshot.description,
            deadline: entry.snapshot.deadline,
            organization_ids: entry.snapshot.target_organizations,
            department_ids: entry.snapshot.target_departments,
            user_ids: entry.snapshot.target_users,
        }
    }
}

/// A creator attachment on a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentResponse {
    pub id: Uuid,
    pub file_name: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ReportRequestAttachmentRow> for AttachmentResponse {
    fn from(row: ReportRequestAttachmentRow) -> Self {
        Self {
            id: row.id,
            file_name: row.file_name,
            file_path: row.file_path,
            file_type: row.file_type,
            file_size: row.file_size,
            uploaded_at: row.uploaded_at,
        }
    }
}
