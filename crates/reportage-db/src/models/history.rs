//! History and comment log models.
//!
//! Version numbers are assigned inside the INSERT (max + 1 per entity) so
//! monotonicity holds at the data layer; the unique (entity, version)
//! constraint rejects any race that would produce a duplicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A request edit history row. The snapshot column holds the serialized
/// pre-change state.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RequestHistoryRow {
    pub id: Uuid,
    pub report_request_id: Uuid,
    pub version: i32,
    pub edited_by: Uuid,
    pub edited_at: DateTime<Utc>,
    pub snapshot: serde_json::Value,
}

impl RequestHistoryRow {
    /// Append a snapshot, assigning the next version for the request.
    pub async fn append(
        pool: &sqlx::PgPool,
        report_request_id: Uuid,
        edited_by: Uuid,
        snapshot: serde_json::Value,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO report_request_history (report_request_id, version, edited_by, snapshot)
            SELECT $1, COALESCE(MAX(version), 0) + 1, $2, $3
            FROM report_request_history
            WHERE report_request_id = $1
            RETURNING *
            "#,
        )
        .bind(report_request_id)
        .bind(edited_by)
        .bind(snapshot)
        .fetch_one(pool)
        .await
    }

    /// History of a request, newest version first.
    pub async fn list_for_request(
        pool: &sqlx::PgPool,
        report_request_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_request_history
            WHERE report_request_id = $1
            ORDER BY version DESC
            "#,
        )
        .bind(report_request_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a request's history.
    pub async fn delete_for_request(
        pool: &sqlx::PgPool,
        report_request_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM report_request_history WHERE report_request_id = $1
            "#,
        )
        .bind(report_request_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// A response edit history row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ResponseHistoryRow {
    pub id: Uuid,
    pub report_response_id: Uuid,
    pub version: i32,
    pub edited_by: Uuid,
    pub edited_at: DateTime<Utc>,
    pub snapshot: serde_json::Value,
}

impl ResponseHistoryRow {
    /// Append a snapshot, assigning the next version for the response.
    pub async fn append(
        pool: &sqlx::PgPool,
        report_response_id: Uuid,
        edited_by: Uuid,
        snapshot: serde_json::Value,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO report_response_history (report_response_id, version, edited_by, snapshot)
            SELECT $1, COALESCE(MAX(version), 0) + 1, $2, $3
            FROM report_response_history
            WHERE report_response_id = $1
            RETURNING *
            "#,
        )
        .bind(report_response_id)
        .bind(edited_by)
        .bind(snapshot)
        .fetch_one(pool)
        .await
    }

    /// History of a response, newest version first.
    pub async fn list_for_response(
        pool: &sqlx::PgPool,
        report_response_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_response_history
            WHERE report_response_id = $1
            ORDER BY version DESC
            "#,
        )
        .bind(report_response_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a response's history.
    pub async fn delete_for_response(
        pool: &sqlx::PgPool,
        report_response_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM report_response_history WHERE report_response_id = $1
            "#,
        )
        .bind(report_response_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// An evaluation comment log row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ResponseCommentRow {
    pub id: Uuid,
    pub report_response_id: Uuid,
    pub commented_by: Uuid,
    pub commented_at: DateTime<Utc>,
    pub comment: Option<String>,
    pub score: Option<f64>,
    pub is_final_evaluation: bool,
}

impl ResponseCommentRow {
    /// Append a comment entry.
    pub async fn append(
        pool: &sqlx::PgPool,
        report_response_id: Uuid,
        commented_by: Uuid,
        comment: Option<&str>,
        score: Option<f64>,
        is_final_evaluation: bool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO report_response_comments (
                report_response_id, commented_by, comment, score, is_final_evaluation
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(report_response_id)
        .bind(commented_by)
        .bind(comment)
        .bind(score)
        .bind(is_final_evaluation)
        .fetch_one(pool)
        .await
    }

    /// Comment log of a response, newest first.
    pub async fn list_for_response(
        pool: &sqlx::PgPool,
        report_response_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_response_comments
            WHERE report_response_id = $1
            ORDER BY commented_at DESC
            "#,
        )
        .bind(report_response_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a response's comment log.
    pub async fn delete_for_response(
        pool: &sqlx::PgPool,
        report_response_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM report_response_comments WHERE report_response_id = $1
            "#,
        )
        .bind(report_response_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
