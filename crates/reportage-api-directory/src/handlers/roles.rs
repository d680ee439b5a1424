//! Role management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use reportage_auth::JwtClaims;
use reportage_db::models::RoleRow;

use crate::error::{ApiDirectoryError, ApiResult};
use crate::handlers::actor_id;
use crate::models::{RoleRequest, RoleResponse};
use crate::router::DirectoryState;

/// List roles.
#[utoipa::path(
    get,
    path = "/directory/roles",
    tag = "Directory - Roles",
    responses(
        (status = 200, description = "Roles", body = [RoleResponse])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    actor_id(&claims)?;
    let rows = RoleRow::list_all(&state.pool).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Create a role.
#[utoipa::path(
    post,
    path = "/directory/roles",
    tag = "Directory - Roles",
    request_body = RoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleResponse),
        (status = 400, description = "Invalid request")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Json(request): Json<RoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    request.validate()?;
    actor_id(&claims)?;
    let row = RoleRow::create(
        &state.pool,
        &request.name,
        request.description.as_deref(),
        request.is_senior,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Get a role by id.
#[utoipa::path(
    get,
    path = "/directory/roles/{id}",
    tag = "Directory - Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role details", body = RoleResponse),
        (status = 404, description = "Role not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_role(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RoleResponse>> {
    actor_id(&claims)?;
    let row = RoleRow::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiDirectoryError::NotFound(format!("Role not found: {id}")))?;
    Ok(Json(row.into()))
}

/// Update a role.
#[utoipa::path(
    put,
    path = "/directory/roles/{id}",
    tag = "Directory - Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    request_body = RoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleResponse),
        (status = 404, description = "Role not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    request.validate()?;
    actor_id(&claims)?;
    let row = RoleRow::update(
        &state.pool,
        id,
        &request.name,
        request.description.as_deref(),
        request.is_senior,
    )
    .await?
    .ok_or_else(|| ApiDirectoryError::NotFound(format!("Role not found: {id}")))?;
    Ok(Json(row.into()))
}

/// Delete a role.
#[utoipa::path(
    delete,
    path = "/directory/roles/{id}",
    tag = "Directory - Roles",
    params(("id" = Uuid, Path, description = "Role ID")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role is still assigned to users")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    actor_id(&claims)?;
    if !RoleRow::delete(&state.pool, id).await? {
        return Err(ApiDirectoryError::NotFound(format!("Role not found: {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}
