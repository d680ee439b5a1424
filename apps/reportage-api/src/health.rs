//! Health check endpoint.

use std::time::Instant;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use sqlx::PgPool;

/// Shared state for the health endpoint.
#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    started_at: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            started_at: Instant::now(),
        }
    }
}

/// Report process liveness and database connectivity.
///
/// Always returns 200; the `database` field carries the dependency status
/// so orchestrators and dashboards can distinguish a degraded instance
/// from a dead one.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "unhealthy"
        }
    };

    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "database": database,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
