//! Department model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A department row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DepartmentRow {
    pub id: Uuid,
    pub name: String,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl DepartmentRow {
    /// Create a department.
    pub async fn create(
        pool: &sqlx::PgPool,
        name: &str,
        organization_id: Option<Uuid>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO departments (name, organization_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(organization_id)
        .fetch_one(pool)
        .await
    }

    /// Update a department.
    pub async fn update(
        pool: &sqlx::PgPool,
        id: Uuid,
        name: &str,
        organization_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE departments
            SET name = $2, organization_id = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(organization_id)
        .fetch_optional(pool)
        .await
    }

    /// Find a department by id.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM departments WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// All departments ordered by name.
    pub async fn list_all(pool: &sqlx::PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM departments ORDER BY name ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Delete a department.
    pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM departments WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
