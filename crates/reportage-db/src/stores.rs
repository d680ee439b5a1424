//! PostgreSQL implementations of the workflow store traits.
//!
//! Each adapter wraps a [`PgPool`] and delegates to the row models in
//! [`crate::models`], mapping rows into the domain entities. The conditional
//! writes (`score IS NULL`, `self_score IS NULL`, version assignment inside
//! the INSERT) carry the domain invariants down to the data layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use reportage_workflow::{
    CommentStore, DirectoryRef, DirectoryStore, FileMetadata, ReportRequest, ReportRequestUpdate,
    ReportResponse, RequestHistoryEntry, RequestHistoryStore, RequestSnapshot, RequestStatus,
    RequestStore, ResponseComment, ResponseHistoryEntry, ResponseHistoryStore, ResponseItem,
    ResponseSnapshot, ResponseStore, Result, UserProfile, WorkflowError,
};

use crate::models::{
    ReportRequestRow, ReportResponseRow, RequestHistoryRow, ResponseCommentRow,
    ResponseHistoryRow, ResponseItemRow, RoleRow, UserRow,
};

/// PostgreSQL-backed [`RequestStore`].
#[derive(Clone)]
pub struct PgRequestStore {
    pool: PgPool,
}

impl PgRequestStore {
    /// Create a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RequestStore for PgRequestStore {
    async fn create(&self, request: ReportRequest) -> Result<ReportRequest> {
        let row = ReportRequestRow::insert(&self.pool, &request).await?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReportRequest>> {
        Ok(ReportRequestRow::find_by_id(&self.pool, id)
            .await?
            .map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<ReportRequest>> {
        Ok(ReportRequestRow::list_all(&self.pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn list_by_creator(&self, user_id: Uuid) -> Result<Vec<ReportRequest>> {
        Ok(ReportRequestRow::list_by_creator(&self.pool, user_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn list_received(
        &self,
        user_id: Uuid,
        department_id: Option<Uuid>,
        organization_ids: &[Uuid],
    ) -> Result<Vec<ReportRequest>> {
        Ok(
            ReportRequestRow::list_received(&self.pool, user_id, department_id, organization_ids)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        )
    }

    async fn update_fields(
        &self,
        id: Uuid,
        update: ReportRequestUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportRequest>> {
        Ok(ReportRequestRow::update_fields(&self.pool, id, &update, now)
            .await?
            .map(Into::into))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportRequest>> {
        Ok(ReportRequestRow::update_status(&self.pool, id, status, now)
            .await?
            .map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(ReportRequestRow::delete(&self.pool, id).await?)
    }

    async fn list_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReportRequest>> {
        Ok(ReportRequestRow::list_due_between(&self.pool, from, to)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

/// PostgreSQL-backed [`ResponseStore`].
#[derive(Clone)]
pub struct PgResponseStore {
    pool: PgPool,
}

impl PgResponseStore {
    /// Create a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn assemble(&self, row: ReportResponseRow) -> Result<ReportResponse> {
        let items = ResponseItemRow::list_for_response(&self.pool, row.id).await?;
        Ok(row.into_response(items))
    }

    async fn assemble_all(&self, rows: Vec<ReportResponseRow>) -> Result<Vec<ReportResponse>> {
        let mut responses = Vec::with_capacity(rows.len());
        for row in rows {
            responses.push(self.assemble(row).await?);
        }
        Ok(responses)
    }
}

fn map_unique_violation(err: sqlx::Error) -> WorkflowError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return WorkflowError::ResponseAlreadySubmitted;
        }
    }
    WorkflowError::Database(err)
}

#[async_trait::async_trait]
impl ResponseStore for PgResponseStore {
    async fn create(&self, response: ReportResponse) -> Result<ReportResponse> {
        let row = ReportResponseRow::insert(&self.pool, &response)
            .await
            .map_err(map_unique_violation)?;
        self.assemble(row).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReportResponse>> {
        match ReportResponseRow::find_by_id(&self.pool, id).await? {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_request_and_user(
        &self,
        request_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ReportResponse>> {
        match ReportResponseRow::find_by_request_and_user(&self.pool, request_id, user_id).await? {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_by_request(&self, request_id: Uuid) -> Result<Vec<ReportResponse>> {
        let rows = ReportResponseRow::list_by_request(&self.pool, request_id).await?;
        self.assemble_all(rows).await
    }

    async fn list_by_submitter(&self, user_id: Uuid) -> Result<Vec<ReportResponse>> {
        let rows = ReportResponseRow::list_by_submitter(&self.pool, user_id).await?;
        self.assemble_all(rows).await
    }

    async fn list_all(&self) -> Result<Vec<ReportResponse>> {
        let rows = ReportResponseRow::list_all(&self.pool).await?;
        self.assemble_all(rows).await
    }

    async fn replace_content(
        &self,
        id: Uuid,
        note: Option<String>,
        items: Vec<ResponseItem>,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>> {
        match ReportResponseRow::replace_content(&self.pool, id, note.as_deref(), &items, now)
            .await?
        {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn set_evaluation(
        &self,
        id: Uuid,
        score: f64,
        comment: Option<String>,
        evaluated_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>> {
        match ReportResponseRow::set_evaluation(
            &self.pool,
            id,
            score,
            comment.as_deref(),
            evaluated_by,
            now,
        )
        .await?
        {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn set_send_back(
        &self,
        id: Uuid,
        comment: String,
        evaluated_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>> {
        match ReportResponseRow::set_send_back(&self.pool, id, &comment, evaluated_by, now).await? {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn set_self_score(
        &self,
        id: Uuid,
        score: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<ReportResponse>> {
        match ReportResponseRow::set_self_score(&self.pool, id, score, now).await? {
            Some(row) => Ok(Some(self.assemble(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_item(&self, item_id: Uuid) -> Result<Option<(ReportResponse, ResponseItem)>> {
        let Some(item_row) = ResponseItemRow::find_by_id(&self.pool, item_id).await? else {
            return Ok(None);
        };
        let Some(response_row) =
            ReportResponseRow::find_by_id(&self.pool, item_row.report_response_id).await?
        else {
            return Ok(None);
        };
        let response = self.assemble(response_row).await?;
        Ok(Some((response, item_row.into())))
    }

    async fn set_item_attachment(
        &self,
        item_id: Uuid,
        attachment: FileMetadata,
    ) -> Result<Option<ResponseItem>> {
        Ok(
            ResponseItemRow::set_attachment(&self.pool, item_id, &attachment)
                .await?
                .map(Into::into),
        )
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(ReportResponseRow::delete(&self.pool, id).await?)
    }

    async fn delete_for_request(&self, request_id: Uuid) -> Result<u64> {
        Ok(ReportResponseRow::delete_for_request(&self.pool, request_id).await?)
    }
}

/// PostgreSQL-backed [`RequestHistoryStore`].
#[derive(Clone)]
pub struct PgRequestHistoryStore {
    pool: PgPool,
}

impl PgRequestHistoryStore {
    /// Create a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn request_entry_from_row(row: RequestHistoryRow) -> Result<RequestHistoryEntry> {
    let snapshot: RequestSnapshot = serde_json::from_value(row.snapshot)?;
    Ok(RequestHistoryEntry {
        id: row.id,
        request_id: row.report_request_id,
        version: row.version,
        edited_by: row.edited_by,
        edited_at: row.edited_at,
        snapshot,
    })
}

#[async_trait::async_trait]
impl RequestHistoryStore for PgRequestHistoryStore {
    async fn append(
        &self,
        request_id: Uuid,
        edited_by: Uuid,
        snapshot: RequestSnapshot,
    ) -> Result<RequestHistoryEntry> {
        let value = serde_json::to_value(&snapshot)?;
        let row = RequestHistoryRow::append(&self.pool, request_id, edited_by, value).await?;
        request_entry_from_row(row)
    }

    async fn list(&self, request_id: Uuid) -> Result<Vec<RequestHistoryEntry>> {
        RequestHistoryRow::list_for_request(&self.pool, request_id)
            .await?
            .into_iter()
            .map(request_entry_from_row)
            .collect()
    }

    async fn delete_for_request(&self, request_id: Uuid) -> Result<u64> {
        Ok(RequestHistoryRow::delete_for_request(&self.pool, request_id).await?)
    }
}

/// PostgreSQL-backed [`ResponseHistoryStore`].
#[derive(Clone)]
pub struct PgResponseHistoryStore {
    pool: PgPool,
}

impl PgResponseHistoryStore {
    /// Create a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn response_entry_from_row(row: ResponseHistoryRow) -> Result<ResponseHistoryEntry> {
    let snapshot: ResponseSnapshot = serde_json::from_value(row.snapshot)?;
    Ok(ResponseHistoryEntry {
        id: row.id,
        response_id: row.report_response_id,
        version: row.version,
        edited_by: row.edited_by,
        edited_at: row.edited_at,
        snapshot,
    })
}

#[async_trait::async_trait]
impl ResponseHistoryStore for PgResponseHistoryStore {
    async fn append(
        &self,
        response_id: Uuid,
        edited_by: Uuid,
        snapshot: ResponseSnapshot,
    ) -> Result<ResponseHistoryEntry> {
        let value = serde_json::to_value(&snapshot)?;
        let row = ResponseHistoryRow::append(&self.pool, response_id, edited_by, value).await?;
        response_entry_from_row(row)
    }

    async fn list(&self, response_id: Uuid) -> Result<Vec<ResponseHistoryEntry>> {
        ResponseHistoryRow::list_for_response(&self.pool, response_id)
            .await?
            .into_iter()
            .map(response_entry_from_row)
            .collect()
    }

    async fn delete_for_response(&self, response_id: Uuid) -> Result<u64> {
        Ok(ResponseHistoryRow::delete_for_response(&self.pool, response_id).await?)
    }
}

/// PostgreSQL-backed [`CommentStore`].
#[derive(Clone)]
pub struct PgCommentStore {
    pool: PgPool,
}

impl PgCommentStore {
    /// Create a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn comment_from_row(row: ResponseCommentRow) -> ResponseComment {
    ResponseComment {
        id: row.id,
        response_id: row.report_response_id,
        commented_by: row.commented_by,
        commented_at: row.commented_at,
        comment: row.comment,
        score: row.score,
        is_final_evaluation: row.is_final_evaluation,
    }
}

#[async_trait::async_trait]
impl CommentStore for PgCommentStore {
    async fn append(
        &self,
        response_id: Uuid,
        commented_by: Uuid,
        comment: Option<String>,
        score: Option<f64>,
        is_final_evaluation: bool,
    ) -> Result<ResponseComment> {
        let row = ResponseCommentRow::append(
            &self.pool,
            response_id,
            commented_by,
            comment.as_deref(),
            score,
            is_final_evaluation,
        )
        .await?;
        Ok(comment_from_row(row))
    }

    async fn list(&self, response_id: Uuid) -> Result<Vec<ResponseComment>> {
        Ok(ResponseCommentRow::list_for_response(&self.pool, response_id)
            .await?
            .into_iter()
            .map(comment_from_row)
            .collect())
    }

    async fn delete_for_response(&self, response_id: Uuid) -> Result<u64> {
        Ok(ResponseCommentRow::delete_for_response(&self.pool, response_id).await?)
    }
}

/// PostgreSQL-backed [`DirectoryStore`].
#[derive(Clone)]
pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    /// Create a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let Some(user) = UserRow::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };

        let (role, is_senior) = match user.role_id {
            Some(role_id) => match RoleRow::find_by_id(&self.pool, role_id).await? {
                Some(role) => (Some(role.name), role.is_senior),
                None => (None, false),
            },
            None => (None, false),
        };

        let department: Option<DirectoryRef> = match user.department_id {
            Some(department_id) => sqlx::query_as::<_, (Uuid, String)>(
                r#"
                SELECT id, name FROM departments WHERE id = $1
                "#,
            )
            .bind(department_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(WorkflowError::Database)?
            .map(|(id, name)| DirectoryRef { id, name }),
            None => None,
        };

        let organizations: Vec<DirectoryRef> = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT o.id, o.name FROM organizations o
            JOIN user_organizations uo ON uo.organization_id = o.id
            WHERE uo.user_id = $1
            ORDER BY o.name ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(WorkflowError::Database)?
        .into_iter()
        .map(|(id, name)| DirectoryRef { id, name })
        .collect();

        Ok(Some(UserProfile {
            id: user.id,
            full_name: user.full_name,
            email: Some(user.email),
            role,
            is_senior,
            department,
            organizations,
            is_active: user.is_active,
        }))
    }

    async fn users_in_department(&self, department_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(UserRow::list_by_department(&self.pool, department_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect())
    }

    async fn users_in_organization(&self, organization_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(UserRow::list_by_organization(&self.pool, organization_id)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect())
    }
}
