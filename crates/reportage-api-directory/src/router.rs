//! Router configuration for the directory API.

use axum::{routing::get, Router};
use sqlx::PgPool;

use crate::handlers::{departments, organizations, positions, roles, users};

/// Shared state for directory handlers.
#[derive(Clone)]
pub struct DirectoryState {
    pub(crate) pool: PgPool,
}

/// Build the directory router. Nest under `/directory`.
pub fn directory_router(pool: PgPool) -> Router {
    let state = DirectoryState { pool };

    Router::new()
        .route(
            "/organizations",
            get(organizations::list_organizations).post(organizations::create_organization),
        )
        .route(
            "/organizations/:id",
            get(organizations::get_organization)
                .put(organizations::update_organization)
                .delete(organizations::delete_organization),
        )
        .route(
            "/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/departments/:id",
            get(departments::get_department)
                .put(departments::update_department)
                .delete(departments::delete_department),
        )
        .route(
            "/positions",
            get(positions::list_positions).post(positions::create_position),
        )
        .route(
            "/positions/:id",
            get(positions::get_position)
                .put(positions::update_position)
                .delete(positions::delete_position),
        )
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/:id",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/me", get(users::get_me))
        .route("/users/recipients", get(users::list_recipients))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .with_state(state)
}
