//! Role model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A role row. `is_senior` marks senior/management roles that widen the
/// recipient scope to the whole directory.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RoleRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_senior: bool,
}

impl RoleRow {
    /// Create a role.
    pub async fn create(
        pool: &sqlx::PgPool,
        name: &str,
        description: Option<&str>,
        is_senior: bool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r#"
            INSERT INTO roles (name, description, is_senior)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(is_senior)
        .fetch_one(pool)
        .await
    }

    /// Update a role.
    pub async fn update(
        pool: &sqlx::PgPool,
        id: Uuid,
        name: &str,
        description: Option<&str>,
        is_senior: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            UPDATE roles
            SET name = $2, description = $3, is_senior = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(is_senior)
        .fetch_optional(pool)
        .await
    }

    /// Find a role by id.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM roles WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// All roles ordered by name.
    pub async fn list_all(pool: &sqlx::PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM roles ORDER BY name ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Delete a role.
    pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM roles WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
