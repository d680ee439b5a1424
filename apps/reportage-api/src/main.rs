//! Reportage API server.
//!
//! Serves the report request lifecycle (`/reports`) and the organizational
//! directory (`/directory`) behind bearer-token authentication, with a
//! public health endpoint and a background deadline-reminder sweep.

mod config;
mod health;
mod logging;
mod reminders;

use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::get, Extension, Router};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use reportage_api_directory::directory_router;
use reportage_api_reports::{reports_router, LocalFileStore};
use reportage_auth::{jwt_auth_middleware, JwtSecret};

use config::Config;
use health::{health_handler, AppState};

/// Upload body limit; item attachments are images and PDFs.
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        "Starting reportage API"
    );

    // Create database connection pool
    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = reportage_db::run_migrations(&pool).await {
        eprintln!("Failed to run migrations: {e}");
        std::process::exit(1);
    }

    let files = LocalFileStore::new(&config.file_storage_root);
    let jwt_secret = JwtSecret(config.jwt_secret.as_bytes().to_vec());

    // Authenticated API surfaces; the JWT middleware inserts claims into
    // request extensions for every handler.
    let reports_routes = reports_router(pool.clone(), files)
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
        .layer(Extension(jwt_secret.clone()));

    let directory_routes = directory_router(pool.clone())
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
        .layer(Extension(jwt_secret));

    let app_state = AppState::new(pool.clone());

    let app = Router::new()
        // Health check endpoint (no auth required)
        .route("/health", get(health_handler))
        .with_state(app_state)
        .nest("/reports", reports_routes)
        .nest("/directory", directory_routes)
        .layer(tower_http::limit::RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(build_cors_layer(&config.cors_origins));

    // Background deadline-reminder sweep
    reminders::spawn_deadline_reminders(
        pool,
        config.reminder_interval_secs,
        config.reminder_window_hours,
    );

    // Bind and serve
    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Build the CORS layer from configured origins.
///
/// Credentials are only enabled for an explicit origin list; the wildcard
/// cannot carry them per the CORS spec.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    use tower_http::cors::AllowOrigin;

    let is_wildcard = origins.len() == 1 && origins[0] == "*";

    let mut layer = CorsLayer::new().max_age(Duration::from_secs(3600));

    if is_wildcard {
        layer = layer
            .allow_origin(AllowOrigin::any())
            .allow_methods(Any)
            .allow_headers(Any);
    } else {
        use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
        use axum::http::Method;

        let allowed: Vec<axum::http::HeaderValue> =
            origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer = layer
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT, ORIGIN])
            .allow_credentials(true);
    }

    layer
}

/// Graceful shutdown on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
