//! Domain types for the report request lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, WorkflowError};

/// Score bounds shared by evaluation and self-evaluation.
pub const MIN_SCORE: f64 = 0.0;
/// Upper score bound.
pub const MAX_SCORE: f64 = 10.0;

/// Status of a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Created, no recipient activity yet.
    Pending,
    /// A recipient has started working on it.
    InProgress,
    /// At least one response has been submitted.
    Submitted,
    /// Evaluated or manually closed.
    Completed,
    /// Withdrawn by the creator.
    Cancelled,
}

impl RequestStatus {
    /// Check if the status is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Check whether a recipient may move the request from `self` to `to`.
    ///
    /// Recipients may start work (Pending → `InProgress`) and may close any
    /// non-terminal request (manual override to Completed). Everything else
    /// is reserved for the creator or the submission path.
    #[must_use]
    pub fn recipient_transition_allowed(&self, to: RequestStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, to) {
            (Self::Pending, Self::InProgress) => true,
            (_, Self::Completed) => true,
            _ => false,
        }
    }

    /// Status after a response submission: advances to Submitted unless the
    /// request is already further along.
    #[must_use]
    pub fn advance_on_submission(&self) -> RequestStatus {
        match self {
            Self::Pending | Self::InProgress => Self::Submitted,
            other => *other,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Submitted => write!(f, "submitted"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Per-recipient status derived from response existence and score presence.
///
/// Distinct from [`RequestStatus`]: a request has one stored status, but each
/// recipient additionally has a derived status computed by
/// [`derived_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStatus {
    /// No response submitted yet.
    Pending,
    /// Response submitted, awaiting evaluation.
    Submitted,
    /// Response evaluated.
    Completed,
}

/// The single derivation rule for per-recipient status.
///
/// `None` → Pending; unscored response → Submitted; scored → Completed.
#[must_use]
pub fn derived_status(response: Option<&ReportResponse>) -> DerivedStatus {
    match response {
        None => DerivedStatus::Pending,
        Some(r) if r.score.is_some() => DerivedStatus::Completed,
        Some(_) => DerivedStatus::Submitted,
    }
}

/// Letter rating derived from an average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    A,
    B,
    C,
    D,
}

impl Rating {
    /// Bucket an average score into a letter rating.
    ///
    /// Cutoffs: A ≥ 8.5, B ≥ 7.0, C ≥ 5.0, D below.
    #[must_use]
    pub fn from_average(average: f64) -> Rating {
        if average >= 8.5 {
            Rating::A
        } else if average >= 7.0 {
            Rating::B
        } else if average >= 5.0 {
            Rating::C
        } else {
            Rating::D
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::C => write!(f, "C"),
            Self::D => write!(f, "D"),
        }
    }
}

/// Validate a score against the shared 0-10 range.
pub fn validate_score(score: f64) -> Result<()> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) || score.is_nan() {
        return Err(WorkflowError::ScoreOutOfRange(score));
    }
    Ok(())
}

/// A reference to a directory entity, carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRef {
    pub id: Uuid,
    pub name: String,
}

/// Stored file metadata for an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Original file name.
    pub file_name: String,
    /// Storage path used for retrieval.
    pub file_path: String,
    /// MIME type as reported at upload.
    pub file_type: Option<String>,
    /// Size in bytes.
    pub file_size: i64,
}

/// A report request: a unit of work asking recipients for a report by a
/// deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub status: RequestStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Source request when this request was created by forwarding.
    pub forwarded_from: Option<Uuid>,
    /// Provenance note recorded at forward time.
    pub forward_note: Option<String>,
    pub target_organizations: Vec<Uuid>,
    pub target_departments: Vec<Uuid>,
    pub target_users: Vec<Uuid>,
}

impl ReportRequest {
    /// True when the deadline has passed relative to `now`.
    #[must_use]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }
}

/// Input for creating a report request.
#[derive(Debug, Clone)]
pub struct NewReportRequest {
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub target_organizations: Vec<Uuid>,
    pub target_departments: Vec<Uuid>,
    pub target_users: Vec<Uuid>,
}

/// Input for editing a report request's mutable fields.
#[derive(Debug, Clone)]
pub struct ReportRequestUpdate {
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub target_organizations: Vec<Uuid>,
    pub target_departments: Vec<Uuid>,
    pub target_users: Vec<Uuid>,
}

/// Input for forwarding a request to new recipients.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub title: String,
    pub forward_note: Option<String>,
    pub deadline: DateTime<Utc>,
    pub target_users: Vec<Uuid>,
}

/// One recipient's answer to a report request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: Uuid,
    pub report_request_id: Uuid,
    pub submitted_by: Uuid,
    pub note: Option<String>,
    pub items: Vec<ResponseItem>,
    /// Evaluator score; non-null locks the response.
    pub score: Option<f64>,
    /// Submitter's own one-time score.
    pub self_score: Option<f64>,
    /// Latest evaluator remark.
    pub comment: Option<String>,
    pub evaluated_by: Option<Uuid>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub self_evaluated_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportResponse {
    /// True once an evaluator score has been recorded.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.score.is_some()
    }
}

/// One line item within a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseItem {
    pub id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    /// Completion percentage, 0-100.
    pub progress: i32,
    pub difficulties: Option<String>,
    pub attachment: Option<FileMetadata>,
    /// Presentation and attachment-matching order.
    pub display_order: i32,
}

/// Input for one item in a submit/update call.
#[derive(Debug, Clone, Default)]
pub struct NewResponseItem {
    pub title: Option<String>,
    pub content: Option<String>,
    pub progress: Option<i32>,
    pub difficulties: Option<String>,
    pub display_order: Option<i32>,
}

/// Validate a submitted item batch.
///
/// Each item must carry a non-blank title or content and a progress within
/// 0-100. Returns the normalized items (defaults applied, display order
/// falling back to list position).
pub fn validate_items(items: &[NewResponseItem]) -> Result<Vec<ResponseItem>> {
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let title_blank = item.title.as_deref().map_or(true, |t| t.trim().is_empty());
        let content_blank = item
            .content
            .as_deref()
            .map_or(true, |c| c.trim().is_empty());
        if title_blank && content_blank {
            return Err(WorkflowError::EmptyItem(index));
        }

        let progress = item.progress.unwrap_or(0);
        if !(0..=100).contains(&progress) {
            return Err(WorkflowError::ProgressOutOfRange(progress));
        }

        out.push(ResponseItem {
            id: Uuid::new_v4(),
            title: item.title.clone(),
            content: item.content.clone(),
            progress,
            difficulties: item.difficulties.clone(),
            attachment: None,
            display_order: item.display_order.unwrap_or(index as i32),
        });
    }
    Ok(out)
}

/// Per-request rollup of recipient progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRollup {
    /// Recipients with no response yet.
    pub pending_count: usize,
    /// Recipients who submitted but are unscored.
    pub submitted_count: usize,
    /// Recipients whose response has been scored.
    pub completed_count: usize,
    /// User ids with scored responses.
    pub completed_user_ids: Vec<Uuid>,
}

/// Compute the rollup for a request from its resolved recipients and the
/// responses on file. Derivation reuses [`derived_status`] per recipient.
#[must_use]
pub fn response_rollup(recipients: &[Uuid], responses: &[ReportResponse]) -> RequestRollup {
    let mut rollup = RequestRollup::default();
    for user in recipients {
        let response = responses.iter().find(|r| r.submitted_by == *user);
        match derived_status(response) {
            DerivedStatus::Pending => rollup.pending_count += 1,
            DerivedStatus::Submitted => rollup.submitted_count += 1,
            DerivedStatus::Completed => {
                rollup.completed_count += 1;
                rollup.completed_user_ids.push(*user);
            }
        }
    }
    rollup
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn response(score: Option<f64>) -> ReportResponse {
        ReportResponse {
            id: Uuid::new_v4(),
            report_request_id: Uuid::new_v4(),
            submitted_by: Uuid::new_v4(),
            note: None,
            items: vec![],
            score,
            self_score: None,
            comment: None,
            evaluated_by: None,
            evaluated_at: None,
            self_evaluated_at: None,
            submitted_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::InProgress.is_terminal());
        assert!(!RequestStatus::Submitted.is_terminal());
    }

    #[test]
    fn test_recipient_transitions() {
        use RequestStatus::*;
        assert!(Pending.recipient_transition_allowed(InProgress));
        assert!(InProgress.recipient_transition_allowed(Completed));
        assert!(Pending.recipient_transition_allowed(Completed));
        assert!(Submitted.recipient_transition_allowed(Completed));

        assert!(!Pending.recipient_transition_allowed(Submitted));
        assert!(!InProgress.recipient_transition_allowed(Pending));
        assert!(!Completed.recipient_transition_allowed(InProgress));
        assert!(!Cancelled.recipient_transition_allowed(Completed));
    }

    #[test]
    fn test_advance_on_submission() {
        use RequestStatus::*;
        assert_eq!(Pending.advance_on_submission(), Submitted);
        assert_eq!(InProgress.advance_on_submission(), Submitted);
        assert_eq!(Submitted.advance_on_submission(), Submitted);
        assert_eq!(Completed.advance_on_submission(), Completed);
        assert_eq!(Cancelled.advance_on_submission(), Cancelled);
    }

    #[test]
    fn test_derived_status_rule() {
        assert_eq!(derived_status(None), DerivedStatus::Pending);
        assert_eq!(
            derived_status(Some(&response(None))),
            DerivedStatus::Submitted
        );
        assert_eq!(
            derived_status(Some(&response(Some(7.0)))),
            DerivedStatus::Completed
        );
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(Rating::from_average(10.0), Rating::A);
        assert_eq!(Rating::from_average(8.5), Rating::A);
        assert_eq!(Rating::from_average(8.49), Rating::B);
        assert_eq!(Rating::from_average(7.0), Rating::B);
        assert_eq!(Rating::from_average(6.99), Rating::C);
        assert_eq!(Rating::from_average(5.0), Rating::C);
        assert_eq!(Rating::from_average(4.99), Rating::D);
        assert_eq!(Rating::from_average(0.0), Rating::D);
    }

    #[test]
    fn test_validate_score_bounds() {
        assert!(validate_score(0.0).is_ok());
        assert!(validate_score(10.0).is_ok());
        assert!(validate_score(8.5).is_ok());
        assert!(validate_score(-0.1).is_err());
        assert!(validate_score(10.1).is_err());
        assert!(validate_score(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_items_rejects_blank() {
        let items = vec![NewResponseItem {
            title: Some("  ".to_string()),
            content: Some(String::new()),
            ..Default::default()
        }];
        match validate_items(&items) {
            Err(WorkflowError::EmptyItem(0)) => {}
            other => panic!("expected EmptyItem, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_items_rejects_bad_progress() {
        let items = vec![NewResponseItem {
            title: Some("ok".to_string()),
            progress: Some(101),
            ..Default::default()
        }];
        match validate_items(&items) {
            Err(WorkflowError::ProgressOutOfRange(101)) => {}
            other => panic!("expected ProgressOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_items_defaults() {
        let items = vec![
            NewResponseItem {
                title: Some("first".to_string()),
                ..Default::default()
            },
            NewResponseItem {
                content: Some("second".to_string()),
                progress: Some(80),
                ..Default::default()
            },
        ];
        let out = validate_items(&items).unwrap();
        assert_eq!(out[0].progress, 0);
        assert_eq!(out[0].display_order, 0);
        assert_eq!(out[1].progress, 80);
        assert_eq!(out[1].display_order, 1);
    }

    #[test]
    fn test_response_rollup() {
        let users: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

        let mut scored = response(Some(9.0));
        scored.submitted_by = users[0];
        let mut unscored = response(None);
        unscored.submitted_by = users[1];

        let rollup = response_rollup(&users, &[scored, unscored]);
        assert_eq!(rollup.completed_count, 1);
        assert_eq!(rollup.submitted_count, 1);
        assert_eq!(rollup.pending_count, 2);
        assert_eq!(rollup.completed_user_ids, vec![users[0]]);
    }

    #[test]
    fn test_overdue_check() {
        let now = Utc::now();
        let request = ReportRequest {
            id: Uuid::new_v4(),
            title: "t".into(),
            description: None,
            deadline: now - Duration::hours(1),
            status: RequestStatus::Pending,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            forwarded_from: None,
            forward_note: None,
            target_organizations: vec![],
            target_departments: vec![],
            target_users: vec![],
        };
        assert!(request.is_overdue_at(now));
        assert!(!request.is_overdue_at(now - Duration::hours(2)));
    }
}
