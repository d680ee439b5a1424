//! Integration tests for route mounting and bearer-token enforcement.
//!
//! The routers are assembled exactly as `main` wires them, over a lazy
//! pool that never connects; the auth middleware rejects unauthenticated
//! requests before any handler touches the database.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Extension, Router,
};
use tower::ServiceExt;

use reportage_api_directory::directory_router;
use reportage_api_reports::{reports_router, LocalFileStore};
use reportage_auth::{jwt_auth_middleware, JwtSecret};

const SECRET: &[u8] = b"integration-test-secret";

fn test_app() -> Router {
    let pool = sqlx::PgPool::connect_lazy("postgres://localhost/reportage_test")
        .expect("lazy pool");
    let files = LocalFileStore::new(std::env::temp_dir());

    let reports_routes = reports_router(pool.clone(), files)
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
        .layer(Extension(JwtSecret(SECRET.to_vec())));

    let directory_routes = directory_router(pool)
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
        .layer(Extension(JwtSecret(SECRET.to_vec())));

    Router::new()
        .nest("/reports", reports_routes)
        .nest("/directory", directory_routes)
}

fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = auth {
        builder = builder.header("Authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_reports_require_token() {
    let response = test_app()
        .oneshot(get_request("/reports/requests", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_directory_requires_token() {
    let response = test_app()
        .oneshot(get_request("/directory/users", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_statistics_require_token() {
    let response = test_app()
        .oneshot(get_request("/reports/statistics", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let response = test_app()
        .oneshot(get_request("/reports/requests", Some("Bearer not.a.token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let claims = reportage_auth::JwtClaims::builder()
        .subject("5e7c2f1a-9d3b-4c8e-b1a6-2f4d8e9c0a11")
        .expires_in_secs(600)
        .build();
    let token = reportage_auth::encode_token(&claims, b"a-different-secret").unwrap();

    let response = test_app()
        .oneshot(get_request(
            "/reports/requests",
            Some(&format!("Bearer {token}")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_404_not_401() {
    // Routes outside the authenticated nests are plain 404s.
    let response = test_app()
        .oneshot(get_request("/nope", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
