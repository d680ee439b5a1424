//! Report request lifecycle: creation, editing, status transitions,
//! forwarding, deletion.
//!
//! All operations take the acting user explicitly; nothing reads an ambient
//! session. Invariants enforced here:
//! - a request must resolve to at least one recipient at creation;
//! - the deadline must be in the future at creation;
//! - every accepted edit appends a pre-change history snapshot first;
//! - recipients may only perform the transitions the state machine allows,
//!   while the creator may override any non-cancelled status;
//! - forwarding creates a new, independent request and never touches the
//!   source.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::directory::{resolve_recipients, DirectoryStore};
use crate::error::{Result, WorkflowError};
use crate::history::{
    CommentStore, RequestHistoryEntry, RequestHistoryStore, RequestSnapshot, ResponseHistoryStore,
};
use crate::responses::ResponseStore;
use crate::types::{
    response_rollup, ForwardRequest, NewReportRequest, ReportRequest, ReportRequestUpdate,
    RequestRollup, RequestStatus, FileMetadata,
};

/// Storage backend for report requests.
#[async_trait::async_trait]
pub trait RequestStore: Send + Sync {
    /// Persist a new request.
    async fn create(&self, request: ReportRequest) -> Result<ReportRequest>;

    /// Load a request by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReportRequest>>;

    /// All requests, newest first.
    async fn list_all(&self) -> Result<Vec<ReportRequest>>;

    /// Requests created by a user, newest first.
    async fn list_by_creator(&self, user_id: Uuid) -> Result<Vec<ReportRequest>>;

    /// Requests targeting a user directly or via their department or
    /// organizations, newest first.
    async fn list_received(
        &self,
        user_id: Uuid,
        department_id: Option<Uuid>,
        organization_ids: &[Uuid],
    ) -> Result<Vec<ReportRequest>>;

    /// Replace the mutable fields. Returns the updated row, or `None` if the
    /// request does not exist.
    async fn update_fields(
        &self,
        id: Uuid,
        update: ReportRequestUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportRequest>>;

    /// Set the status. Returns the updated row, or `None` if absent.
    async fn update_status(
        &self,
        id: Uuid,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportRequest>>;

    /// Delete a request row. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Non-terminal requests whose deadline falls within the window
    /// (deadline-reminder sweep).
    async fn list_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReportRequest>>;
}

/// Filters for the administrative request listing.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    /// Case-insensitive match over title and description.
    pub search: Option<String>,
    pub status: Option<RequestStatus>,
    pub created_by: Option<Uuid>,
    /// Requests with a response from this user.
    pub submitted_by: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
}

/// Service for report request operations.
pub struct RequestService {
    requests: Arc<dyn RequestStore>,
    responses: Arc<dyn ResponseStore>,
    request_history: Arc<dyn RequestHistoryStore>,
    response_history: Arc<dyn ResponseHistoryStore>,
    comments: Arc<dyn CommentStore>,
    directory: Arc<dyn DirectoryStore>,
}

impl RequestService {
    /// Create a new request service over the given stores.
    pub fn new(
        requests: Arc<dyn RequestStore>,
        responses: Arc<dyn ResponseStore>,
        request_history: Arc<dyn RequestHistoryStore>,
        response_history: Arc<dyn ResponseHistoryStore>,
        comments: Arc<dyn CommentStore>,
        directory: Arc<dyn DirectoryStore>,
    ) -> Self {
        Self {
            requests,
            responses,
            request_history,
            response_history,
            comments,
            directory,
        }
    }

    /// Create a report request.
    pub async fn create_request(
        &self,
        actor: Uuid,
        input: NewReportRequest,
    ) -> Result<ReportRequest> {
        if input.title.trim().is_empty() {
            return Err(WorkflowError::Validation("Title must not be empty".into()));
        }
        let now = Utc::now();
        if input.deadline <= now {
            return Err(WorkflowError::DeadlineInPast);
        }
        self.directory
            .get_user(actor)
            .await?
            .ok_or(WorkflowError::UserNotFound(actor))?;

        let recipients = resolve_recipients(
            self.directory.as_ref(),
            &input.target_users,
            &input.target_departments,
            &input.target_organizations,
        )
        .await?;
        if recipients.is_empty() {
            return Err(WorkflowError::NoRecipients);
        }

        let request = ReportRequest {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            deadline: input.deadline,
            status: RequestStatus::Pending,
            created_by: actor,
            created_at: now,
            updated_at: now,
            forwarded_from: None,
            forward_note: None,
            target_organizations: input.target_organizations,
            target_departments: input.target_departments,
            target_users: input.target_users,
        };
        self.requests.create(request).await
    }

    /// Load a request or fail with not-found.
    pub async fn get_request(&self, id: Uuid) -> Result<ReportRequest> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or(WorkflowError::RequestNotFound(id))
    }

    /// All requests, newest first.
    pub async fn list_all(&self) -> Result<Vec<ReportRequest>> {
        self.requests.list_all().await
    }

    /// Requests created by the acting user.
    pub async fn list_created_by(&self, actor: Uuid) -> Result<Vec<ReportRequest>> {
        self.requests.list_by_creator(actor).await
    }

    /// Requests the acting user received (targeted directly or via their
    /// department/organizations).
    pub async fn list_received(&self, actor: Uuid) -> Result<Vec<ReportRequest>> {
        let profile = self
            .directory
            .get_user(actor)
            .await?
            .ok_or(WorkflowError::UserNotFound(actor))?;
        let organization_ids: Vec<Uuid> =
            profile.organizations.iter().map(|o| o.id).collect();
        self.requests
            .list_received(
                actor,
                profile.department.as_ref().map(|d| d.id),
                &organization_ids,
            )
            .await
    }

    /// Administrative listing with in-memory filters.
    pub async fn list_with_filters(&self, filter: &RequestFilter) -> Result<Vec<ReportRequest>> {
        let mut requests = self.requests.list_all().await?;

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            requests.retain(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            });
        }
        if let Some(status) = filter.status {
            requests.retain(|r| r.status == status);
        }
        if let Some(created_by) = filter.created_by {
            requests.retain(|r| r.created_by == created_by);
        }
        if let Some(organization_id) = filter.organization_id {
            requests.retain(|r| r.target_organizations.contains(&organization_id));
        }
        if let Some(department_id) = filter.department_id {
            requests.retain(|r| r.target_departments.contains(&department_id));
        }
        if let Some(submitted_by) = filter.submitted_by {
            let mut kept = Vec::with_capacity(requests.len());
            for request in requests {
                let responses = self.responses.list_by_request(request.id).await?;
                if responses.iter().any(|r| r.submitted_by == submitted_by) {
                    kept.push(request);
                }
            }
            requests = kept;
        }
        Ok(requests)
    }

    /// Compute the per-recipient rollup for a request.
    pub async fn rollup(&self, request: &ReportRequest) -> Result<RequestRollup> {
        let recipients = resolve_recipients(
            self.directory.as_ref(),
            &request.target_users,
            &request.target_departments,
            &request.target_organizations,
        )
        .await?;
        let responses = self.responses.list_by_request(request.id).await?;
        Ok(response_rollup(&recipients, &responses))
    }

    /// Edit a request's mutable fields. Creator only. Appends a pre-change
    /// history snapshot before applying; identical content is a no-op.
    pub async fn update_request(
        &self,
        actor: Uuid,
        id: Uuid,
        update: ReportRequestUpdate,
    ) -> Result<ReportRequest> {
        let request = self.get_request(id).await?;
        if request.created_by != actor {
            return Err(WorkflowError::NotCreator);
        }
        if update.title.trim().is_empty() {
            return Err(WorkflowError::Validation("Title must not be empty".into()));
        }

        let unchanged = request.title == update.title
            && request.description == update.description
            && request.deadline == update.deadline
            && request.target_organizations == update.target_organizations
            && request.target_departments == update.target_departments
            && request.target_users == update.target_users;
        if unchanged {
            return Ok(request);
        }

        // Snapshot the pre-change state before the mutation is applied.
        self.request_history
            .append(id, actor, RequestSnapshot::from(&request))
            .await?;

        self.requests
            .update_fields(id, update, Utc::now())
            .await?
            .ok_or(WorkflowError::RequestNotFound(id))
    }

    /// Change a request's status.
    ///
    /// The creator may set any status except that nothing leaves Cancelled;
    /// a recipient is limited to the state-machine transitions. Anyone else
    /// is rejected.
    pub async fn update_status(
        &self,
        actor: Uuid,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<ReportRequest> {
        let request = self.get_request(id).await?;

        if request.created_by == actor {
            if request.status == RequestStatus::Cancelled {
                return Err(WorkflowError::TerminalStatus(request.status));
            }
        } else {
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
            if !request.status.recipient_transition_allowed(status) {
                return Err(WorkflowError::InvalidTransition {
                    from: request.status,
                    to: status,
                });
            }
        }

        self.requests
            .update_status(id, status, Utc::now())
            .await?
            .ok_or(WorkflowError::RequestNotFound(id))
    }

    /// Forward a request: derive a new, independent request from an existing
    /// one. The source is never mutated.
    pub async fn forward(
        &self,
        actor: Uuid,
        source_id: Uuid,
        input: ForwardRequest,
    ) -> Result<ReportRequest> {
        let source = self.get_request(source_id).await?;

        let source_recipients = resolve_recipients(
            self.directory.as_ref(),
            &source.target_users,
            &source.target_departments,
            &source.target_organizations,
        )
        .await?;
        if source.created_by != actor && !source_recipients.contains(&actor) {
            return Err(WorkflowError::ForwardNotPermitted);
        }

        if input.title.trim().is_empty() {
            return Err(WorkflowError::Validation("Title must not be empty".into()));
        }
        let now = Utc::now();
        if input.deadline <= now {
            return Err(WorkflowError::DeadlineInPast);
        }
        if input.target_users.is_empty() {
            return Err(WorkflowError::NoRecipients);
        }

        let description = match (&source.description, &input.forward_note) {
            (Some(desc), Some(note)) if !note.trim().is_empty() => {
                Some(format!("{desc}\n\n--- Forward note ---\n{note}"))
            }
            (None, Some(note)) if !note.trim().is_empty() => {
                Some(format!("--- Forward note ---\n{note}"))
            }
            (desc, _) => desc.clone(),
        };

        let forwarded = ReportRequest {
            id: Uuid::new_v4(),
            title: input.title,
            description,
            deadline: input.deadline,
            status: RequestStatus::Pending,
            created_by: actor,
            created_at: now,
            updated_at: now,
            forwarded_from: Some(source.id),
            forward_note: input.forward_note,
            target_organizations: vec![],
            target_departments: vec![],
            target_users: input.target_users,
        };
        self.requests.create(forwarded).await
    }

    /// Delete a request and everything hanging off it. Creator only.
    ///
    /// Returns the attachment metadata of all deleted response items so the
    /// caller can remove the stored files.
    pub async fn delete_request(&self, actor: Uuid, id: Uuid) -> Result<Vec<FileMetadata>> {
        let request = self.get_request(id).await?;
        if request.created_by != actor {
            return Err(WorkflowError::NotCreator);
        }

        let responses = self.responses.list_by_request(id).await?;
        let mut orphaned_files = Vec::new();
        for response in &responses {
            orphaned_files.extend(
                response
                    .items
                    .iter()
                    .filter_map(|item| item.attachment.clone()),
            );
            self.response_history
                .delete_for_response(response.id)
                .await?;
            self.comments.delete_for_response(response.id).await?;
        }
        self.responses.delete_for_request(id).await?;
        self.request_history.delete_for_request(id).await?;
        self.requests.delete(id).await?;

        tracing::info!(
            request_id = %id,
            responses = responses.len(),
            "Deleted report request and dependents"
        );
        Ok(orphaned_files)
    }

    /// Edit history for a request, newest first.
    pub async fn history(&self, id: Uuid) -> Result<Vec<RequestHistoryEntry>> {
        self.get_request(id).await?;
        self.request_history.list(id).await
    }
}

/// In-memory request store for testing.
#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    requests: Arc<RwLock<HashMap<Uuid, ReportRequest>>>,
}

impl InMemoryRequestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn create(&self, request: ReportRequest) -> Result<ReportRequest> {
        self.requests
            .write()
            .await
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReportRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ReportRequest>> {
        let mut all: Vec<_> = self.requests.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn list_by_creator(&self, user_id: Uuid) -> Result<Vec<ReportRequest>> {
        let mut all: Vec<_> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| r.created_by == user_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn list_received(
        &self,
        user_id: Uuid,
        department_id: Option<Uuid>,
        organization_ids: &[Uuid],
    ) -> Result<Vec<ReportRequest>> {
        let mut all: Vec<_> = self
            .requests
            .read()
            .await
            .values()
            .filter(|r| {
                r.target_users.contains(&user_id)
                    || department_id
                        .is_some_and(|d| r.target_departments.contains(&d))
                    || organization_ids
                        .iter()
                        .any(|o| r.target_organizations.contains(o))
            })
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_fields(
        &self,
        id: Uuid,
        update: ReportRequestUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportRequest>> {
        let mut requests = self.requests.write().await;
        let Some(request) = requests.get_mut(&id) else {
            return Ok(None);
        };
        request.title = update.title;
        request.description = update.description;
        request.deadline = update.deadline;
        request.target_organizations = update.target_organizations;
        request.target_departments = update.target_departments;
        request.target_users = update.target_users;
        request.updated_at = now;
        Ok(Some(request.clone()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportRequest>> {
        let mut requests = self.requests.write().await;
        let Some(request) = requests.get_mut(&id) else {
            return Ok(None);
        };
        request.status = status;
        request.updated_at = now;
        Ok(Some(request.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.requests.write().await.remove(&id).is_some())
    }

    async fn list_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReportRequest>> {
        Ok(self
            .requests
            .read()
            .await
            .values()
            .filter(|r| !r.status.is_terminal() && r.deadline > from && r.deadline <= to)
            .cloned()
            .collect())
    }
}
