//! JWT authentication middleware.
//!
//! Extracts and validates the bearer token from the Authorization header,
//! then inserts [`JwtClaims`] into the request extensions for handlers.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::claims::JwtClaims;
use crate::jwt::decode_token;

/// Shared JWT verification secret, provided via `Extension`.
#[derive(Clone)]
pub struct JwtSecret(pub Vec<u8>);

/// JWT authentication middleware.
///
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Decodes and validates the JWT against the configured secret
/// 3. Inserts [`JwtClaims`] into request extensions
///
/// A missing or invalid token yields 401; a missing secret configuration
/// yields 500.
///
/// # Usage
///
/// ```rust,ignore
/// let router = Router::new()
///     .route("/reports/requests", get(list_requests))
///     .layer(axum::middleware::from_fn(jwt_auth_middleware))
///     .layer(axum::Extension(JwtSecret(secret_bytes)));
/// ```
pub async fn jwt_auth_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let secret = request
        .extensions()
        .get::<JwtSecret>()
        .ok_or_else(|| {
            tracing::error!("JWT secret not configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error",
            )
                .into_response()
        })?
        .0
        .clone();

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            (StatusCode::UNAUTHORIZED, "Missing Authorization header").into_response()
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header format",
        )
            .into_response()
    })?;

    if token.is_empty() {
        tracing::warn!("Rejected empty bearer token");
        return Err((StatusCode::UNAUTHORIZED, "Empty bearer token").into_response());
    }

    let claims = decode_token(token, &secret).map_err(|e| {
        tracing::warn!("JWT validation failed: {}", e);
        (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn, routing::get, Extension, Router};
    use tower::ServiceExt;

    const SECRET: &[u8] = b"middleware-test-secret";

    async fn whoami(Extension(claims): Extension<JwtClaims>) -> String {
        claims.sub
    }

    fn app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(from_fn(jwt_auth_middleware))
            .layer(Extension(JwtSecret(SECRET.to_vec())))
    }

    fn request_with_auth(value: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(v) = value {
            builder = builder.header("Authorization", v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_passes() {
        let claims = JwtClaims::builder()
            .subject("user-42")
            .expires_in_secs(600)
            .build();
        let token = crate::jwt::encode_token(&claims, SECRET).unwrap();

        let response = app()
            .oneshot(request_with_auth(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let response = app().oneshot(request_with_auth(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_header_rejected() {
        let response = app()
            .oneshot(request_with_auth(Some("Token abc")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_bearer_rejected() {
        let response = app()
            .oneshot(request_with_auth(Some("Bearer ")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let claims = JwtClaims::builder()
            .subject("user-42")
            .expires_in_secs(600)
            .build();
        let token = crate::jwt::encode_token(&claims, b"different-secret").unwrap();

        let response = app()
            .oneshot(request_with_auth(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
