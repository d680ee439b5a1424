//! Department management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use reportage_auth::JwtClaims;
use reportage_db::models::{DepartmentRow, OrganizationRow};

use crate::error::{ApiDirectoryError, ApiResult};
use crate::handlers::actor_id;
use crate::models::{DepartmentRequest, DepartmentResponse};
use crate::router::DirectoryState;

async fn check_organization(state: &DirectoryState, id: Option<Uuid>) -> ApiResult<()> {
    if let Some(organization_id) = id {
        if OrganizationRow::find_by_id(&state.pool, organization_id)
            .await?
            .is_none()
        {
            return Err(ApiDirectoryError::NotFound(format!(
                "Organization not found: {organization_id}"
            )));
        }
    }
    Ok(())
}

/// List departments.
#[utoipa::path(
    get,
    path = "/directory/departments",
    tag = "Directory - Departments",
    responses(
        (status = 200, description = "Departments", body = [DepartmentResponse])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_departments(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<Vec<DepartmentResponse>>> {
    actor_id(&claims)?;
    let rows = DepartmentRow::list_all(&state.pool).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Create a department.
#[utoipa::path(
    post,
    path = "/directory/departments",
    tag = "Directory - Departments",
    request_body = DepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Owning organization not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_department(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Json(request): Json<DepartmentRequest>,
) -> ApiResult<(StatusCode, Json<DepartmentResponse>)> {
    request.validate()?;
    actor_id(&claims)?;
    check_organization(&state, request.organization_id).await?;
    let row =
        DepartmentRow::create(&state.pool, &request.name, request.organization_id).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Get a department by id.
#[utoipa::path(
    get,
    path = "/directory/departments/{id}",
    tag = "Directory - Departments",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department details", body = DepartmentResponse),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_department(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DepartmentResponse>> {
    actor_id(&claims)?;
    let row = DepartmentRow::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiDirectoryError::NotFound(format!("Department not found: {id}")))?;
    Ok(Json(row.into()))
}

/// Update a department.
#[utoipa::path(
    put,
    path = "/directory/departments/{id}",
    tag = "Directory - Departments",
    params(("id" = Uuid, Path, description = "Department ID")),
    request_body = DepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_department(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<DepartmentRequest>,
) -> ApiResult<Json<DepartmentResponse>> {
    request.validate()?;
    actor_id(&claims)?;
    check_organization(&state, request.organization_id).await?;
    let row = DepartmentRow::update(&state.pool, id, &request.name, request.organization_id)
        .await?
        .ok_or_else(|| ApiDirectoryError::NotFound(format!("Department not found: {id}")))?;
    Ok(Json(row.into()))
}

/// Delete a department.
#[utoipa::path(
    delete,
    path = "/directory/departments/{id}",
    tag = "Directory - Departments",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Department still has members")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_department(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    actor_id(&claims)?;
    if !DepartmentRow::delete(&state.pool, id).await? {
        return Err(ApiDirectoryError::NotFound(format!(
            "Department not found: {id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
