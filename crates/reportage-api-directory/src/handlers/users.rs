//! User management and recipient candidate handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use reportage_auth::JwtClaims;
use reportage_db::models::{
    CreateUser, DepartmentRow, OrganizationRow, PositionRow, RoleRow, UpdateUser, UserRow,
};
use reportage_db::PgDirectoryStore;
use reportage_workflow::{resolve_recipient_scope, DirectoryStore, RecipientScope};

use crate::error::{ApiDirectoryError, ApiResult};
use crate::handlers::actor_id;
use crate::models::{
    CreateUserRequest, ListUsersQuery, RecipientsResponse, UpdateUserRequest, UserResponse,
};
use crate::router::DirectoryState;

async fn enrich_user(state: &DirectoryState, user: UserRow) -> ApiResult<UserResponse> {
    let role = match user.role_id {
        Some(role_id) => RoleRow::find_by_id(&state.pool, role_id).await?,
        None => None,
    };
    let department = match user.department_id {
        Some(department_id) => DepartmentRow::find_by_id(&state.pool, department_id).await?,
        None => None,
    };
    let position = match user.position_id {
        Some(position_id) => PositionRow::find_by_id(&state.pool, position_id).await?,
        None => None,
    };

    let mut organizations = Vec::new();
    for organization_id in UserRow::organization_ids(&state.pool, user.id).await? {
        if let Some(organization) =
            OrganizationRow::find_by_id(&state.pool, organization_id).await?
        {
            organizations.push(organization);
        }
    }

    Ok(UserResponse::from_parts(
        user,
        role,
        department,
        position,
        organizations,
    ))
}

async fn enrich_users(
    state: &DirectoryState,
    users: Vec<UserRow>,
) -> ApiResult<Vec<UserResponse>> {
    let mut out = Vec::with_capacity(users.len());
    for user in users {
        out.push(enrich_user(state, user).await?);
    }
    Ok(out)
}

/// List users, optionally filtered by department or organization.
#[utoipa::path(
    get,
    path = "/directory/users",
    tag = "Directory - Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    actor_id(&claims)?;
    let users = if let Some(department_id) = query.department_id {
        UserRow::list_by_department(&state.pool, department_id).await?
    } else if let Some(organization_id) = query.organization_id {
        UserRow::list_by_organization(&state.pool, organization_id).await?
    } else {
        UserRow::list_all(&state.pool).await?
    };
    Ok(Json(enrich_users(&state, users).await?))
}

/// The current user's profile.
#[utoipa::path(
    get,
    path = "/directory/users/me",
    tag = "Directory - Users",
    responses(
        (status = 200, description = "The caller's profile", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<UserResponse>> {
    let actor = actor_id(&claims)?;
    let user = UserRow::find_by_id(&state.pool, actor)
        .await?
        .ok_or_else(|| ApiDirectoryError::NotFound(format!("User not found: {actor}")))?;
    Ok(Json(enrich_user(&state, user).await?))
}

/// Candidate recipients for the current user's next request or forward.
///
/// Recomputed from the caller's profile on every call; senior roles see
/// everyone, department members see their department, organization-only
/// members see their first organization. The caller is excluded.
#[utoipa::path(
    get,
    path = "/directory/users/recipients",
    tag = "Directory - Users",
    responses(
        (status = 200, description = "Candidate recipients", body = RecipientsResponse),
        (status = 404, description = "Caller not found in the directory")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_recipients(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
) -> ApiResult<Json<RecipientsResponse>> {
    let actor = actor_id(&claims)?;
    let directory = PgDirectoryStore::new(state.pool.clone());
    let profile = directory
        .get_user(actor)
        .await?
        .ok_or_else(|| ApiDirectoryError::NotFound(format!("User not found: {actor}")))?;

    let scope = resolve_recipient_scope(&profile);
    let users = match &scope {
        RecipientScope::All => UserRow::list_all(&state.pool).await?,
        RecipientScope::Department(id) => UserRow::list_by_department(&state.pool, *id).await?,
        RecipientScope::Organization(id) => {
            UserRow::list_by_organization(&state.pool, *id).await?
        }
    };

    let users: Vec<UserRow> = users
        .into_iter()
        .filter(|u| u.id != actor && u.is_active)
        .collect();

    Ok(Json(RecipientsResponse {
        scope,
        users: enrich_users(&state, users).await?,
    }))
}

/// Get a user by id.
#[utoipa::path(
    get,
    path = "/directory/users/{id}",
    tag = "Directory - Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    actor_id(&claims)?;
    let user = UserRow::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiDirectoryError::NotFound(format!("User not found: {id}")))?;
    Ok(Json(enrich_user(&state, user).await?))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/directory/users",
    tag = "Directory - Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    request.validate()?;
    actor_id(&claims)?;

    let user = UserRow::create(
        &state.pool,
        &CreateUser {
            email: request.email,
            full_name: request.full_name,
            phone: request.phone,
            role_id: request.role_id,
            department_id: request.department_id,
            position_id: request.position_id,
            organization_ids: request.organization_ids,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(enrich_user(&state, user).await?)))
}

/// Update a user.
#[utoipa::path(
    put,
    path = "/directory/users/{id}",
    tag = "Directory - Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    request.validate()?;
    actor_id(&claims)?;

    let user = UserRow::update(
        &state.pool,
        id,
        &UpdateUser {
            email: request.email,
            full_name: request.full_name,
            phone: request.phone,
            role_id: request.role_id,
            department_id: request.department_id,
            position_id: request.position_id,
            organization_ids: request.organization_ids,
            is_active: request.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiDirectoryError::NotFound(format!("User not found: {id}")))?;

    Ok(Json(enrich_user(&state, user).await?))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/directory/users/{id}",
    tag = "Directory - Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User is referenced by report data")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<DirectoryState>,
    Extension(claims): Extension<JwtClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    actor_id(&claims)?;
    if !UserRow::delete(&state.pool, id).await? {
        return Err(ApiDirectoryError::NotFound(format!("User not found: {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}
