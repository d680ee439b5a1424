//! Position management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use reportage_auth::JwtClaims;
use reportage_db::models::PositionRow;

use crate::error::{ApiDirectoryError, ApiResult};
use crate::handlers::actor_id;
use crate::models::{PositionRequest, PositionResponse};
use crate::router::DirectoryState;

/// List positions.
#[utoipa::path(
    get,
    path = "/directory/positions",
    tag = "Directory - Positions",
    responses(
        (status = 200, description = "Positions", body = [PositionResponse])
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_positions(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<Vec<PositionResponse>>> {
    actor_id(&claims)?;
    let rows = PositionRow::list_all(&state.pool).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// Create a position.
#[utoipa::path(
    post,
    path = "/directory/positions",
    tag = "Directory - Positions",
    request_body = PositionRequest,
    responses(
        (status = 201, description = "Position created", body = PositionResponse),
        (status = 400, description = "Invalid request")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_position(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Json(request): Json<PositionRequest>,
) -> ApiResult<(StatusCode, Json<PositionResponse>)> {
    request.validate()?;
    actor_id(&claims)?;
    let row = PositionRow::create(&state.pool, &request.name).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Get a position by id.
#[utoipa::path(
    get,
    path = "/directory/positions/{id}",
    tag = "Directory - Positions",
    params(("id" = Uuid, Path, description = "Position ID")),
    responses(
        (status = 200, description = "Position details", body = PositionResponse),
        (status = 404, description = "Position not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_position(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PositionResponse>> {
    actor_id(&claims)?;
    let row = PositionRow::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiDirectoryError::NotFound(format!("Position not found: {id}")))?;
    Ok(Json(row.into()))
}

/// Update a position.
#[utoipa::path(
    put,
    path = "/directory/positions/{id}",
    tag = "Directory - Positions",
    params(("id" = Uuid, Path, description = "Position ID")),
    request_body = PositionRequest,
    responses(
        (status = 200, description = "Position updated", body = PositionResponse),
        (status = 404, description = "Position not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_position(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<PositionRequest>,
) -> ApiResult<Json<PositionResponse>> {
    request.validate()?;
    actor_id(&claims)?;
    let row = PositionRow::update(&state.pool, id, &request.name)
        .await?
        .ok_or_else(|| ApiDirectoryError::NotFound(format!("Position not found: {id}")))?;
    Ok(Json(row.into()))
}

/// Delete a position.
#[utoipa::path(
    delete,
    path = "/directory/positions/{id}",
    tag = "Directory - Positions",
    params(("id" = Uuid, Path, description = "Position ID")),
    responses(
        (status = 204, description = "Position deleted"),
        (status = 404, description = "Position not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_position(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    actor_id(&claims)?;
    if !PositionRow::delete(&state.pool, id).await? {
        return Err(ApiDirectoryError::NotFound(format!(
            "Position not found: {id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
