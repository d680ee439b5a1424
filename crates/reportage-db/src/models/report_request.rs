//! Report request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use reportage_workflow::{ReportRequest, ReportRequestUpdate, RequestStatus};

/// A report request row. Target sets are stored as UUID arrays.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReportRequestRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    pub status: RequestStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub forwarded_from: Option<Uuid>,
    pub forward_note: Option<String>,
    pub target_organizations: Vec<Uuid>,
    pub target_departments: Vec<Uuid>,
    pub target_users: Vec<Uuid>,
}

impl From<ReportRequestRow> for ReportRequest {
    fn from(row: ReportRequestRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            deadline: row.deadline,
            status: row.status,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            forwarded_from: row.forwarded_from,
            forward_note: row.forward_note,
            target_organizations: row.target_organizations,
            target_departments: row.target_departments,
            target_users: row.target_users,
        }
    }
}

impl ReportRequestRow {
    /// Insert a request row.
    pub async fn insert(
        pool: &sqlx::PgPool,
        request: &ReportRequest,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO report_requests (
                id, title, description, deadline, status, created_by,
                created_at, updated_at, forwarded_from, forward_note,
                target_organizations, target_departments, target_users
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.deadline)
        .bind(request.status)
        .bind(request.created_by)
        .bind(request.created_at)
        .bind(request.updated_at)
        .bind(request.forwarded_from)
        .bind(&request.forward_note)
        .bind(&request.target_organizations)
        .bind(&request.target_departments)
        .bind(&request.target_users)
        .fetch_one(pool)
        .await
    }

    /// Find a request by id.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_requests WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// All requests, newest first.
    pub async fn list_all(pool: &sqlx::PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_requests ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Requests created by a user, newest first.
    pub async fn list_by_creator(
        pool: &sqlx::PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_requests
            WHERE created_by = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Requests targeting a user directly or via department/organization
    /// membership, newest first.
    pub async fn list_received(
        pool: &sqlx::PgPool,
        user_id: Uuid,
        department_id: Option<Uuid>,
        organization_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_requests
            WHERE $1 = ANY(target_users)
               OR ($2::uuid IS NOT NULL AND $2 = ANY(target_departments))
               OR target_organizations && $3::uuid[]
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(department_id)
        .bind(organization_ids)
        .fetch_all(pool)
        .await
    }

    /// Replace the mutable fields of a request.
    pub async fn update_fields(
        pool: &sqlx::PgPool,
        id: Uuid,
        update: &ReportRequestUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE report_requests
            SET title = $2,
                description = $3,
                deadline = $4,
                target_organizations = $5,
                target_departments = $6,
                target_users = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.deadline)
        .bind(&update.target_organizations)
        .bind(&update.target_departments)
        .bind(&update.target_users)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    /// Set the request status.
    pub async fn update_status(
        pool: &sqlx::PgPool,
        id: Uuid,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE report_requests
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    /// Delete a request row.
    pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM report_requests WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Non-terminal requests with a deadline in the window.
    pub async fn list_due_between(
        pool: &sqlx::PgPool,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_requests
            WHERE status NOT IN ('completed', 'cancelled')
              AND deadline > $1
              AND deadline <= $2
            ORDER BY deadline ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }
}

/// An attachment uploaded by the request creator.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReportRequestAttachmentRow {
    pub id: Uuid,
    pub report_request_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl ReportRequestAttachmentRow {
    /// Record an attachment for a request.
    pub async fn insert(
        pool: &sqlx::PgPool,
        report_request_id: Uuid,
        file_name: &str,
        file_path: &str,
        file_type: Option<&str>,
        file_size: i64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO report_request_attachments (
                report_request_id, file_name, file_path, file_type, file_size
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(report_request_id)
        .bind(file_name)
        .bind(file_path)
        .bind(file_type)
        .bind(file_size)
        .fetch_one(pool)
        .await
    }

    /// Attachments of a request, oldest first.
    pub async fn list_for_request(
        pool: &sqlx::PgPool,
        report_request_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_request_attachments
            WHERE report_request_id = $1
            ORDER BY uploaded_at ASC
            "#,
        )
        .bind(report_request_id)
        .fetch_all(pool)
        .await
    }

    /// Find an attachment by id.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_request_attachments WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Delete an attachment row.
    pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM report_request_attachments WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
