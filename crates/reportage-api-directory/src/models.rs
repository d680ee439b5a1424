//! Request and response models for directory endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use reportage_db::models::{DepartmentRow, OrganizationRow, PositionRow, RoleRow, UserRow};
use reportage_workflow::RecipientScope;

/// Request to create or update an organization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrganizationRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required (1-255 characters)"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,
}

/// An organization as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OrganizationRow> for OrganizationResponse {
    fn from(row: OrganizationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Request to create or update a department.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DepartmentRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required (1-255 characters)"))]
    pub name: String,
    /// Owning organization, if any.
    pub organization_id: Option<Uuid>,
}

/// A department as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepartmentResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<DepartmentRow> for DepartmentResponse {
    fn from(row: DepartmentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            organization_id: row.organization_id,
            created_at: row.created_at,
        }
    }
}

/// Request to create or update a position.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PositionRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required (1-255 characters)"))]
    pub name: String,
}

/// A position as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PositionResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<PositionRow> for PositionResponse {
    fn from(row: PositionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Request to create or update a role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RoleRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required (1-255 characters)"))]
    pub name: String,
    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,
    /// Senior/management designation; widens the recipient scope.
    #[serde(default)]
    pub is_senior: bool,
}

/// A role as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_senior: bool,
}

impl From<RoleRow> for RoleResponse {
    fn from(row: RoleRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            is_senior: row.is_senior,
        }
    }
}

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Full name is required (1-255 characters)"))]
    pub full_name: String,
    #[validate(length(max = 50, message = "Phone must not exceed 50 characters"))]
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    #[serde(default)]
    pub organization_ids: Vec<Uuid>,
}

/// Request to update a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 255, message = "Full name is required (1-255 characters)"))]
    pub full_name: String,
    #[validate(length(max = 50, message = "Phone must not exceed 50 characters"))]
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    #[serde(default)]
    pub organization_ids: Vec<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Query parameters for the user listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Restrict to members of this department.
    pub department_id: Option<Uuid>,
    /// Restrict to members of this organization.
    pub organization_id: Option<Uuid>,
}

/// A user as returned by the API, with resolved references.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionResponse>,
    pub organizations: Vec<OrganizationResponse>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    /// Build the DTO from a user row and its resolved references.
    #[must_use]
    pub fn from_parts(
        user: UserRow,
        role: Option<RoleRow>,
        department: Option<DepartmentRow>,
        position: Option<PositionRow>,
        organizations: Vec<OrganizationRow>,
    ) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: role.map(Into::into),
            department: department.map(Into::into),
            position: position.map(Into::into),
            organizations: organizations.into_iter().map(Into::into).collect(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The candidate recipients a composing user may target.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecipientsResponse {
    /// The scope the candidates were drawn from.
    #[schema(value_type = Object)]
    pub scope: RecipientScope,
    /// Candidate recipients, the caller excluded.
    pub users: Vec<UserResponse>,
}
