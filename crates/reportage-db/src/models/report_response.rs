//! Report response and response item models.
//!
//! The `score IS NULL` predicates on the mutating queries enforce the
//! locking invariant at the data layer: once a response is scored, content
//! edits, send-backs, and re-evaluations cannot apply, regardless of races.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use reportage_workflow::{FileMetadata, ReportResponse, ResponseItem};

/// A report response row (items live in `report_response_items`).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReportResponseRow {
    pub id: Uuid,
    pub report_request_id: Uuid,
    pub submitted_by: Uuid,
    pub note: Option<String>,
    pub score: Option<f64>,
    pub self_score: Option<f64>,
    pub comment: Option<String>,
    pub evaluated_by: Option<Uuid>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub self_evaluated_at: Option<DateTime<Utc>>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportResponseRow {
    /// Assemble the domain entity from this row and its item rows.
    #[must_use]
    pub fn into_response(self, items: Vec<ResponseItemRow>) -> ReportResponse {
        ReportResponse {
            id: self.id,
            report_request_id: self.report_request_id,
            submitted_by: self.submitted_by,
            note: self.note,
            items: items.into_iter().map(ResponseItem::from).collect(),
            score: self.score,
            self_score: self.self_score,
            comment: self.comment,
            evaluated_by: self.evaluated_by,
            evaluated_at: self.evaluated_at,
            self_evaluated_at: self.self_evaluated_at,
            submitted_at: self.submitted_at,
            updated_at: self.updated_at,
        }
    }

    /// Insert a response row together with its items, in one transaction.
    pub async fn insert(
        pool: &sqlx::PgPool,
        response: &ReportResponse,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row: Self = sqlx::query_as(
            r#"
            INSERT INTO report_responses (
                id, report_request_id, submitted_by, note, score, self_score,
                comment, evaluated_by, evaluated_at, self_evaluated_at,
                submitted_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(response.id)
        .bind(response.report_request_id)
        .bind(response.submitted_by)
        .bind(&response.note)
        .bind(response.score)
        .bind(response.self_score)
        .bind(&response.comment)
        .bind(response.evaluated_by)
        .bind(response.evaluated_at)
        .bind(response.self_evaluated_at)
        .bind(response.submitted_at)
        .bind(response.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        for item in &response.items {
            ResponseItemRow::insert_in_tx(&mut tx, response.id, item).await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    /// Find a response by id.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_responses WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Find the response a user submitted for a request.
    pub async fn find_by_request_and_user(
        pool: &sqlx::PgPool,
        report_request_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_responses
            WHERE report_request_id = $1 AND submitted_by = $2
            "#,
        )
        .bind(report_request_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Responses for a request, newest first.
    pub async fn list_by_request(
        pool: &sqlx::PgPool,
        report_request_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_responses
            WHERE report_request_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(report_request_id)
        .fetch_all(pool)
        .await
    }

    /// Responses submitted by a user, newest first.
    pub async fn list_by_submitter(
        pool: &sqlx::PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_responses
            WHERE submitted_by = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// All responses, newest first.
    pub async fn list_all(pool: &sqlx::PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_responses ORDER BY submitted_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Replace note and items while unscored. Returns `None` if the
    /// response is absent or already scored.
    pub async fn replace_content(
        pool: &sqlx::PgPool,
        id: Uuid,
        note: Option<&str>,
        items: &[ResponseItem],
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row: Option<Self> = sqlx::query_as(
            r#"
            UPDATE report_responses
            SET note = $2, updated_at = $3
            WHERE id = $1 AND score IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(note)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            DELETE FROM report_response_items WHERE report_response_id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        for item in items {
            ResponseItemRow::insert_in_tx(&mut tx, id, item).await?;
        }

        tx.commit().await?;
        Ok(Some(row))
    }

    /// Record an evaluation while unscored.
    pub async fn set_evaluation(
        pool: &sqlx::PgPool,
        id: Uuid,
        score: f64,
        comment: Option<&str>,
        evaluated_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE report_responses
            SET score = $2,
                comment = $3,
                evaluated_by = $4,
                evaluated_at = $5,
                updated_at = $5
            WHERE id = $1 AND score IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(score)
        .bind(comment)
        .bind(evaluated_by)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    /// Record a send-back comment while unscored.
    pub async fn set_send_back(
        pool: &sqlx::PgPool,
        id: Uuid,
        comment: &str,
        evaluated_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE report_responses
            SET comment = $2,
                evaluated_by = $3,
                evaluated_at = $4,
                updated_at = $4
            WHERE id = $1 AND score IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(comment)
        .bind(evaluated_by)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    /// Record the one-time self-score while unset.
    pub async fn set_self_score(
        pool: &sqlx::PgPool,
        id: Uuid,
        score: f64,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE report_responses
            SET self_score = $2,
                self_evaluated_at = $3,
                updated_at = $3
            WHERE id = $1 AND self_score IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(score)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    /// Delete a response row.
    pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM report_responses WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all responses of a request.
    pub async fn delete_for_request(
        pool: &sqlx::PgPool,
        report_request_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM report_responses WHERE report_request_id = $1
            "#,
        )
        .bind(report_request_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// A response item row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ResponseItemRow {
    pub id: Uuid,
    pub report_response_id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub progress: i32,
    pub difficulties: Option<String>,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub display_order: i32,
}

impl From<ResponseItemRow> for ResponseItem {
    fn from(row: ResponseItemRow) -> Self {
        let attachment = match (row.file_name, row.file_path) {
            (Some(file_name), Some(file_path)) => Some(FileMetadata {
                file_name,
                file_path,
                file_type: row.file_type,
                file_size: row.file_size.unwrap_or(0),
            }),
            _ => None,
        };
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            progress: row.progress,
            difficulties: row.difficulties,
            attachment,
            display_order: row.display_order,
        }
    }
}

impl ResponseItemRow {
    async fn insert_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        report_response_id: Uuid,
        item: &ResponseItem,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO report_response_items (
                id, report_response_id, title, content, progress, difficulties,
                file_name, file_path, file_type, file_size, display_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(item.id)
        .bind(report_response_id)
        .bind(&item.title)
        .bind(&item.content)
        .bind(item.progress)
        .bind(&item.difficulties)
        .bind(item.attachment.as_ref().map(|a| a.file_name.clone()))
        .bind(item.attachment.as_ref().map(|a| a.file_path.clone()))
        .bind(item.attachment.as_ref().and_then(|a| a.file_type.clone()))
        .bind(item.attachment.as_ref().map(|a| a.file_size))
        .bind(item.display_order)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Items of a response in display order.
    pub async fn list_for_response(
        pool: &sqlx::PgPool,
        report_response_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_response_items
            WHERE report_response_id = $1
            ORDER BY display_order ASC
            "#,
        )
        .bind(report_response_id)
        .fetch_all(pool)
        .await
    }

    /// Find an item by id.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM report_response_items WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Attach file metadata while the owning response is unscored.
    pub async fn set_attachment(
        pool: &sqlx::PgPool,
        item_id: Uuid,
        attachment: &FileMetadata,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE report_response_items AS i
            SET file_name = $2, file_path = $3, file_type = $4, file_size = $5
            FROM report_responses AS r
            WHERE i.id = $1
              AND r.id = i.report_response_id
              AND r.score IS NULL
            RETURNING i.*
            "#,
        )
        .bind(item_id)
        .bind(&attachment.file_name)
        .bind(&attachment.file_path)
        .bind(&attachment.file_type)
        .bind(attachment.file_size)
        .fetch_optional(pool)
        .await
    }
}
