//! User model with role, department, position, and organization links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user row.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub organization_ids: Vec<Uuid>,
}

/// Input for updating a user.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub organization_ids: Vec<Uuid>,
    pub is_active: bool,
}

impl UserRow {
    /// Create a user and link their organizations, in one transaction.
    pub async fn create(pool: &sqlx::PgPool, input: &CreateUser) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row: Self = sqlx::query_as(
            r#"
            INSERT INTO users (email, full_name, phone, role_id, department_id, position_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(&input.phone)
        .bind(input.role_id)
        .bind(input.department_id)
        .bind(input.position_id)
        .fetch_one(&mut *tx)
        .await?;

        for organization_id in &input.organization_ids {
            sqlx::query(
                r#"
                INSERT INTO user_organizations (user_id, organization_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(row.id)
            .bind(organization_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    /// Replace a user's fields and organization links.
    pub async fn update(
        pool: &sqlx::PgPool,
        id: Uuid,
        input: &UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row: Option<Self> = sqlx::query_as(
            r#"
            UPDATE users
            SET email = $2,
                full_name = $3,
                phone = $4,
                role_id = $5,
                department_id = $6,
                position_id = $7,
                is_active = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.email)
        .bind(&input.full_name)
        .bind(&input.phone)
        .bind(input.role_id)
        .bind(input.department_id)
        .bind(input.position_id)
        .bind(input.is_active)
        .fetch_optional(&mut *tx)
        .await?;

        if row.is_some() {
            sqlx::query(
                r#"
                DELETE FROM user_organizations WHERE user_id = $1
                "#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
            for organization_id in &input.organization_ids {
                sqlx::query(
                    r#"
                    INSERT INTO user_organizations (user_id, organization_id)
                    VALUES ($1, $2)
                    "#,
                )
                .bind(id)
                .bind(organization_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(row)
    }

    /// Find a user by id.
    pub async fn find_by_id(pool: &sqlx::PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// All users ordered by name.
    pub async fn list_all(pool: &sqlx::PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM users ORDER BY full_name ASC
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Active users of a department, ordered by name.
    pub async fn list_by_department(
        pool: &sqlx::PgPool,
        department_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE department_id = $1 AND is_active
            ORDER BY full_name ASC
            "#,
        )
        .bind(department_id)
        .fetch_all(pool)
        .await
    }

    /// Active users of an organization, ordered by name.
    pub async fn list_by_organization(
        pool: &sqlx::PgPool,
        organization_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT u.* FROM users u
            JOIN user_organizations uo ON uo.user_id = u.id
            WHERE uo.organization_id = $1 AND u.is_active
            ORDER BY u.full_name ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await
    }

    /// Organization ids a user belongs to.
    pub async fn organization_ids(
        pool: &sqlx::PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT organization_id FROM user_organizations WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a user row.
    pub async fn delete(pool: &sqlx::PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
