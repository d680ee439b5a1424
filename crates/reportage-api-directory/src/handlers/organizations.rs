//! Organization management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use reportage_auth::JwtClaims;
use reportage_db::models::OrganizationRow;

use crate::error::{ApiDirectoryError, ApiResult};
use crate::handlers::actor_id;
use crate::models::{OrganizationRequest, OrganizationResponse};
use crate::router::DirectoryState;

/// List organizations.
#[utoipa::path(
    get,
    path = "/directory/organizations",
    tag = "Directory - Organizations",
    responses(
        (status = 200, description = "Organizations", body = [OrganizationResponse])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_organizations(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<Vec<OrganizationResponse>>> {
    actor_id(&claims)?;
    let rows = OrganizationRow::list_all(&state.pool).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Create an organization.
#[utoipa::path(
    post,
    path = "/directory/organizations",
    tag = "Directory - Organizations",
    request_body = OrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = OrganizationResponse),
        (status = 400, description = "Invalid request")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_organization(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Json(request): Json<OrganizationRequest>,
) -> ApiResult<(StatusCode, Json<OrganizationResponse>)> {
    request.validate()?;
    actor_id(&claims)?;
    let row =
        OrganizationRow::create(&state.pool, &request.name, request.description.as_deref())
            .await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Get an organization by id.
#[utoipa::path(
    get,
    path = "/directory/organizations/{id}",
    tag = "Directory - Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization details", body = OrganizationResponse),
        (status = 404, description = "Organization not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_organization(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrganizationResponse>> {
    actor_id(&claims)?;
    let row = OrganizationRow::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiDirectoryError::NotFound(format!("Organization not found: {id}")))?;
    Ok(Json(row.into()))
}

/// Update an organization.
#[utoipa::path(
    put,
    path = "/directory/organizations/{id}",
    tag = "Directory - Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = OrganizationRequest,
    responses(
        (status = 200, description = "Organization updated", body = OrganizationResponse),
        (status = 404, description = "Organization not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_organization(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<OrganizationRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    request.validate()?;
    actor_id(&claims)?;
    let row = OrganizationRow::update(
        &state.pool,
        id,
        &request.name,
        request.description.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiDirectoryError::NotFound(format!("Organization not found: {id}")))?;
    Ok(Json(row.into()))
}

/// Delete an organization.
#[utoipa::path(
    delete,
    path = "/directory/organizations/{id}",
    tag = "Directory - Organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 404, description = "Organization not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_organization(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    actor_id(&claims)?;
    if !OrganizationRow::delete(&state.pool, id).await? {
        return Err(ApiDirectoryError::NotFound(format!(
            "Organization not found: {id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
