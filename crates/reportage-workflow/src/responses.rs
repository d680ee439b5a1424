//! Report response lifecycle: submission, revision, evaluation, send-back,
//! self-evaluation, and per-item attachments.
//!
//! A recipient holds exactly one response per request. Content edits are
//! allowed only while the response is unscored and the request deadline has
//! not passed; an evaluator score freezes the response permanently. The
//! stores expose conditional writes (apply-only-while-unscored) so the
//! locking invariant is enforced at the data layer as well as here.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::directory::{resolve_recipients, DirectoryStore};
use crate::error::{Result, WorkflowError};
use crate::history::{
    CommentStore, ResponseComment, ResponseHistoryEntry, ResponseHistoryStore, ResponseSnapshot,
};
use crate::requests::RequestStore;
use crate::types::{
    validate_items, validate_score, FileMetadata, NewResponseItem, ReportResponse, RequestStatus,
    ResponseItem,
};

/// Storage backend for report responses.
///
/// The `set_*` methods are conditional writes: they apply only while their
/// precondition holds (response unscored, or self-score unset) and return
/// `None` otherwise, so concurrent evaluation attempts cannot corrupt state.
#[async_trait::async_trait]
pub trait ResponseStore: Send + Sync {
    /// Persist a new response. Fails with a conflict when the (request,
    /// submitter) pair already has one.
    async fn create(&self, response: ReportResponse) -> Result<ReportResponse>;

    /// Load a response by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReportResponse>>;

    /// Load the response a user submitted for a request.
    async fn find_by_request_and_user(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReportResponse>>;

    /// Responses for a request, newest first.
    async fn list_by_request(&self, request_id: Uuid) -> Result<Vec<ReportResponse>>;

    /// Responses submitted by a user, newest first.
    async fn list_by_submitter(&self, user_id: Uuid) -> Result<Vec<ReportResponse>>;

    /// All responses, newest first.
    async fn list_all(&self) -> Result<Vec<ReportResponse>>;

    /// Replace note and items while unscored.
    async fn replace_content(
        &self,
        id: Uuid,
        note: Option<String>,
        items: Vec<ResponseItem>,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>>;

    /// Record an evaluation while unscored.
    async fn set_evaluation(
        &self,
        id: Uuid,
        score: f64,
        comment: Option<String>,
        evaluated_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>>;

    /// Record a send-back comment while unscored.
    async fn set_send_back(
        &self,
        id: Uuid,
        comment: String,
        evaluated_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>>;

    /// Record the submitter's one-time self-score while unset.
    async fn set_self_score(
        &self,
        id: Uuid,
        score: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>>;

    /// Locate an item and its owning response.
    async fn find_item(&self, item_id: Uuid) -> Result<Option<(ReportResponse, ResponseItem)>>;

    /// Attach file metadata to an item while the response is unscored.
    async fn set_item_attachment(
        &self,
        item_id: Uuid,
        attachment: FileMetadata,
    ) -> Result<Option<ResponseItem>>;

    /// Delete a response row. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Delete all responses of a request. Returns the number removed.
    async fn delete_for_request(&self, request_id: Uuid) -> Result<u64>;
}

/// Service for report response operations.
pub struct ResponseService {
    responses: Arc<dyn ResponseStore>,
    requests: Arc<dyn RequestStore>,
    response_history: Arc<dyn ResponseHistoryStore>,
    comments: Arc<dyn CommentStore>,
    directory: Arc<dyn DirectoryStore>,
}

impl ResponseService {
    /// Create a new response service over the given stores.
    pub fn new(
        responses: Arc<dyn ResponseStore>,
        requests: Arc<dyn RequestStore>,
        response_history: Arc<dyn ResponseHistoryStore>,
        comments: Arc<dyn CommentStore>,
        directory: Arc<dyn DirectoryStore>,
    ) -> Self {
        Self {
            responses,
            requests,
            response_history,
            comments,
            directory,
        }
    }

    async fn get_request_for_response(&self, request_id: Uuid) -> Result<crate::types::ReportRequest> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or(WorkflowError::RequestNotFound(request_id))
    }

    /// Load a response or fail with not-found.
    pub async fn get_response(&self, id: Uuid) -> Result<ReportResponse> {
        self.responses
            .find_by_id(id)
            .await?
            .ok_or(WorkflowError::ResponseNotFound(id))
    }

    /// A user's response to a request, if any.
    pub async fn get_by_request_and_user(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReportResponse>> {
        self.responses
            .find_by_request_and_user(request_id, user_id)
            .await
    }

    /// Responses for a request, newest first.
    pub async fn list_by_request(&self, request_id: Uuid) -> Result<Vec<ReportResponse>> {
        self.responses.list_by_request(request_id).await
    }

    /// Responses submitted by the acting user, newest first.
    pub async fn list_my(&self, actor: Uuid) -> Result<Vec<ReportResponse>> {
        self.responses.list_by_submitter(actor).await
    }

    /// Submit a first response to a request.
    ///
    /// Enforced here: the actor must be a resolved recipient, the deadline
    /// must not have passed, the request must not be cancelled, at most one
    /// response per (request, user), and all items must be valid. Submission
    /// advances the request status to Submitted.
    pub async fn submit(
        &self,
        actor: Uuid,
        request_id: Uuid,
        note: Option<String>,
        items: Vec<NewResponseItem>,
    ) -> Result<ReportResponse> {
        let request = self.get_request_for_response(request_id).await?;
        let now = Utc::now();

        if request.status == RequestStatus::Cancelled {
            return Err(WorkflowError::TerminalStatus(request.status));
        }
        if request.is_overdue_at(now) {
            return Err(WorkflowError::DeadlineExceeded);
        }

        let recipients = resolve_recipients(
            self.directory.as_ref(),
            &request.target_users,
            &request.target_departments,
            &request.target_organizations,
        )
        .await?;
        if !recipients.contains(&actor) {
            return Err(WorkflowError::NotRecipient);
        }

        if self
            .responses
            .find_by_request_and_user(request_id, actor)
            .await?
            .is_some()
        {
            return Err(WorkflowError::ResponseAlreadySubmitted);
        }

        let items = validate_items(&items)?;
        let response = ReportResponse {
            id: Uuid::new_v4(),
            report_request_id: request_id,
            submitted_by: actor,
            note,
            items,
            score: None,
            self_score: None,
            comment: None,
            evaluated_by: None,
            evaluated_at: None,
            self_evaluated_at: None,
            submitted_at: now,
            updated_at: now,
        };
        let created = self.responses.create(response).await?;

        let next = request.status.advance_on_submission();
        if next != request.status {
            self.requests.update_status(request_id, next, now).await?;
        }

        Ok(created)
    }

    /// Revise an unscored response: replaces note and the full item batch.
    ///
    /// Attachment metadata is carried over from the previous item at the
    /// same display position. A pre-change history snapshot is appended
    /// before the content is replaced; identical content is a no-op.
    pub async fn update(
        &self,
        actor: Uuid,
        response_id: Uuid,
        note: Option<String>,
        items: Vec<NewResponseItem>,
    ) -> Result<ReportResponse> {
        let response = self.get_response(response_id).await?;
        if response.submitted_by != actor {
            return Err(WorkflowError::NotSubmitter);
        }
        let request = self.get_request_for_response(response.report_request_id).await?;
        let now = Utc::now();
        if request.is_overdue_at(now) {
            return Err(WorkflowError::DeadlineExceeded);
        }
        if response.is_locked() {
            return Err(WorkflowError::ResponseLocked(response_id));
        }

        let mut new_items = validate_items(&items)?;

        // Carry attachments over by position in display order.
        let mut old_items = response.items.clone();
        old_items.sort_by_key(|item| item.display_order);
        for (index, item) in new_items.iter_mut().enumerate() {
            if let Some(old) = old_items.get(index) {
                item.attachment = old.attachment.clone();
            }
        }

        if response.note == note && items_equal(&response.items, &new_items) {
            return Ok(response);
        }

        // Snapshot the pre-change state before the mutation is applied.
        self.response_history
            .append(response_id, actor, ResponseSnapshot::from(&response))
            .await?;

        self.responses
            .replace_content(response_id, note, new_items, now)
            .await?
            .ok_or(WorkflowError::ResponseLocked(response_id))
    }

    /// Evaluate a response: assign a score and optional comment, freezing it.
    ///
    /// Request creator only. Appends a final-evaluation comment entry and
    /// moves the request to Completed.
    pub async fn evaluate(
        &self,
        actor: Uuid,
        response_id: Uuid,
        score: f64,
        comment: Option<String>,
    ) -> Result<ReportResponse> {
        let response = self.get_response(response_id).await?;
        let request = self.get_request_for_response(response.report_request_id).await?;
        if request.created_by != actor {
            return Err(WorkflowError::NotCreator);
        }
        validate_score(score)?;
        if response.is_locked() {
            return Err(WorkflowError::ResponseLocked(response_id));
        }

        let now = Utc::now();
        let updated = self
            .responses
            .set_evaluation(response_id, score, comment.clone(), actor, now)
            .await?
            .ok_or(WorkflowError::ResponseLocked(response_id))?;

        self.comments
            .append(response_id, actor, comment, Some(score), true)
            .await?;

        self.requests
            .update_status(request.id, RequestStatus::Completed, now)
            .await?;

        Ok(updated)
    }

    /// Send an unscored response back for revision with a mandatory comment.
    ///
    /// Request creator only. Records a non-final comment entry; the response
    /// stays editable and the request returns to Submitted.
    pub async fn send_back(
        &self,
        actor: Uuid,
        response_id: Uuid,
        comment: String,
    ) -> Result<ReportResponse> {
        if comment.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "A comment is required when sending back".into(),
            ));
        }
        let response = self.get_response(response_id).await?;
        let request = self.get_request_for_response(response.report_request_id).await?;
        if request.created_by != actor {
            return Err(WorkflowError::NotCreator);
        }
        if response.is_locked() {
            return Err(WorkflowError::ResponseLocked(response_id));
        }

        let now = Utc::now();
        let updated = self
            .responses
            .set_send_back(response_id, comment.clone(), actor, now)
            .await?
            .ok_or(WorkflowError::ResponseLocked(response_id))?;

        self.comments
            .append(response_id, actor, Some(comment), None, false)
            .await?;

        if !request.status.is_terminal() {
            self.requests
                .update_status(request.id, RequestStatus::Submitted, now)
                .await?;
        }

        Ok(updated)
    }

    /// Record the submitter's one-time self-score.
    ///
    /// Allowed before or after evaluator scoring, but exactly once.
    pub async fn self_evaluate(
        &self,
        actor: Uuid,
        response_id: Uuid,
        score: f64,
    ) -> Result<ReportResponse> {
        let response = self.get_response(response_id).await?;
        if response.submitted_by != actor {
            return Err(WorkflowError::NotSubmitter);
        }
        validate_score(score)?;
        if response.self_score.is_some() {
            return Err(WorkflowError::SelfScoreAlreadySet(response_id));
        }

        self.responses
            .set_self_score(response_id, score, Utc::now())
            .await?
            .ok_or(WorkflowError::SelfScoreAlreadySet(response_id))
    }

    /// The response owning a persisted item.
    pub async fn get_response_for_item(&self, item_id: Uuid) -> Result<ReportResponse> {
        let (response, _item) = self
            .responses
            .find_item(item_id)
            .await?
            .ok_or(WorkflowError::ItemNotFound(item_id))?;
        Ok(response)
    }

    /// Attach an uploaded file's metadata to a persisted item.
    ///
    /// Issued after the item batch write; matched by the item id returned
    /// from that write. Owner only, deadline- and lock-checked, and recorded
    /// in the response history.
    pub async fn attach_item_file(
        &self,
        actor: Uuid,
        item_id: Uuid,
        attachment: FileMetadata,
    ) -> Result<ResponseItem> {
        let (response, _item) = self
            .responses
            .find_item(item_id)
            .await?
            .ok_or(WorkflowError::ItemNotFound(item_id))?;
        if response.submitted_by != actor {
            return Err(WorkflowError::NotSubmitter);
        }
        let request = self.get_request_for_response(response.report_request_id).await?;
        if request.is_overdue_at(Utc::now()) {
            return Err(WorkflowError::DeadlineExceeded);
        }
        if response.is_locked() {
            return Err(WorkflowError::ResponseLocked(response.id));
        }

        // Snapshot the pre-change state before the attachment lands.
        self.response_history
            .append(response.id, actor, ResponseSnapshot::from(&response))
            .await?;

        self.responses
            .set_item_attachment(item_id, attachment)
            .await?
            .ok_or(WorkflowError::ResponseLocked(response.id))
    }

    /// Delete a response. Submitter only. Returns attachment metadata of the
    /// deleted items so the caller can remove stored files.
    pub async fn delete(&self, actor: Uuid, response_id: Uuid) -> Result<Vec<FileMetadata>> {
        let response = self.get_response(response_id).await?;
        if response.submitted_by != actor {
            return Err(WorkflowError::NotSubmitter);
        }
        let files = response
            .items
            .iter()
            .filter_map(|item| item.attachment.clone())
            .collect();
        self.response_history.delete_for_response(response_id).await?;
        self.comments.delete_for_response(response_id).await?;
        self.responses.delete(response_id).await?;
        Ok(files)
    }

    /// Edit history for a response, newest first. Visible to the submitter
    /// and the request creator.
    pub async fn history(
        &self,
        actor: Uuid,
        response_id: Uuid,
    ) -> Result<Vec<ResponseHistoryEntry>> {
        let response = self.get_response(response_id).await?;
        let request = self.get_request_for_response(response.report_request_id).await?;
        if response.submitted_by != actor && request.created_by != actor {
            return Err(WorkflowError::NotSubmitter);
        }
        self.response_history.list(response_id).await
    }

    /// Evaluation comment log for a response, newest first.
    pub async fn comment_history(&self, response_id: Uuid) -> Result<Vec<ResponseComment>> {
        self.get_response(response_id).await?;
        self.comments.list(response_id).await
    }
}

/// Compare item batches by content, ignoring the regenerated item ids.
fn items_equal(a: &[ResponseItem], b: &[ResponseItem]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(x, y)| {
            x.title == y.title
                && x.content == y.content
                && x.progress == y.progress
                && x.difficulties == y.difficulties
                && x.attachment == y.attachment
                && x.display_order == y.display_order
        })
}

/// In-memory response store for testing.
#[derive(Debug, Default)]
pub struct InMemoryResponseStore {
    responses: Arc<RwLock<HashMap<Uuid, ReportResponse>>>,
}

impl InMemoryResponseStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ResponseStore for InMemoryResponseStore {
    async fn create(&self, response: ReportResponse) -> Result<ReportResponse> {
        let mut responses = self.responses.write().await;
        let duplicate = responses.values().any(|r| {
            r.report_request_id == response.report_request_id
                && r.submitted_by == response.submitted_by
        });
        if duplicate {
            return Err(WorkflowError::ResponseAlreadySubmitted);
        }
        responses.insert(response.id, response.clone());
        Ok(response)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReportResponse>> {
        Ok(self.responses.read().await.get(&id).cloned())
    }

    async fn find_by_request_and_user(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReportResponse>> {
        Ok(self
            .responses
            .read()
            .await
            .values()
            .find(|r| r.report_request_id == request_id && r.submitted_by == user_id)
            .cloned())
    }

    async fn list_by_request(&self, request_id: Uuid) -> Result<Vec<ReportResponse>> {
        let mut all: Vec<_> = self
            .responses
            .read()
            .await
            .values()
            .filter(|r| r.report_request_id == request_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(all)
    }

    async fn list_by_submitter(&self, user_id: Uuid) -> Result<Vec<ReportResponse>> {
        let mut all: Vec<_> = self
            .responses
            .read()
            .await
            .values()
            .filter(|r| r.submitted_by == user_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(all)
    }

    async fn list_all(&self) -> Result<Vec<ReportResponse>> {
        let mut all: Vec<_> = self.responses.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(all)
    }

    async fn replace_content(
        &self,
        id: Uuid,
        note: Option<String>,
        items: Vec<ResponseItem>,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>> {
        let mut responses = self.responses.write().await;
        let Some(response) = responses.get_mut(&id) else {
            return Ok(None);
        };
        if response.score.is_some() {
            return Ok(None);
        }
        response.note = note;
        response.items = items;
        response.updated_at = now;
        Ok(Some(response.clone()))
    }

    async fn set_evaluation(
        &self,
        id: Uuid,
        score: f64,
        comment: Option<String>,
        evaluated_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>> {
        let mut responses = self.responses.write().await;
        let Some(response) = responses.get_mut(&id) else {
            return Ok(None);
        };
        if response.score.is_some() {
            return Ok(None);
        }
        response.score = Some(score);
        response.comment = comment;
        response.evaluated_by = Some(evaluated_by);
        response.evaluated_at = Some(now);
        response.updated_at = now;
        Ok(Some(response.clone()))
    }

    async fn set_send_back(
        &self,
        id: Uuid,
        comment: String,
        evaluated_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>> {
        let mut responses = self.responses.write().await;
        let Some(response) = responses.get_mut(&id) else {
            return Ok(None);
        };
        if response.score.is_some() {
            return Ok(None);
        }
        response.comment = Some(comment);
        response.evaluated_by = Some(evaluated_by);
        response.evaluated_at = Some(now);
        response.updated_at = now;
        Ok(Some(response.clone()))
    }

    async fn set_self_score(
        &self,
        id: Uuid,
        score: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>> {
        let mut responses = self.responses.write().await;
        let Some(response) = responses.get_mut(&id) else {
            return Ok(None);
        };
        if response.self_score.is_some() {
            return Ok(None);
        }
        response.self_score = Some(score);
        response.self_evaluated_at = Some(now);
        response.updated_at = now;
        Ok(Some(response.clone()))
    }

    async fn find_item(&self, item_id: Uuid) -> Result<Option<(ReportResponse, ResponseItem)>> {
        Ok(self.responses.read().await.values().find_map(|r| {
            r.items
                .iter()
                .find(|i| i.id == item_id)
                .map(|i| (r.clone(), i.clone()))
        }))
    }

    async fn set_item_attachment(
        &self,
        item_id: Uuid,
        attachment: FileMetadata,
    ) -> Result<Option<ResponseItem>> {
        let mut responses = self.responses.write().await;
        for response in responses.values_mut() {
            if response.score.is_some() {
                continue;
            }
            if let Some(item) = response.items.iter_mut().find(|i| i.id == item_id) {
                item.attachment = Some(attachment);
                return Ok(Some(item.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.responses.write().await.remove(&id).is_some())
    }

    async fn delete_for_request(&self, request_id: Uuid) -> Result<u64> {
        let mut responses = self.responses.write().await;
        let before = responses.len();
        responses.retain(|_, r| r.report_request_id != request_id);
        Ok((before - responses.len()) as u64)
    }
}
