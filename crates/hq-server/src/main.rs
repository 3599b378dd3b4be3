//! BranchHQ server binary.
//!
//! Startup order matters: the database connection, schema, seed data, and
//! the attachment store are all established before the listener accepts
//! its first request, so no handler ever runs against missing storage.

use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hq_api::{AppState, PgFileService};
use hq_auth::SessionTokens;
use hq_core::AppConfig;
use hq_db::{Database, DatabaseConfig, FileRepository, GridStore, ZoneRepository};
use hq_files::{AllowedFileTypes, FileService};

mod health;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting BranchHQ"
    );

    // Connect and prepare storage before anything can be served
    let db_config = DatabaseConfig::with_url(&config.database.url);
    let db = Database::connect(&db_config).await?;
    db.ensure_schema().await?;
    info!("Connected to database");

    ZoneRepository::new(db.pool().clone()).seed_defaults().await?;

    let files: Arc<PgFileService> = Arc::new(FileService::new(
        Arc::new(FileRepository::new(db.pool().clone())),
        Arc::new(GridStore::new(db.pool().clone())),
        AllowedFileTypes::default(),
    ));

    let tokens = Arc::new(SessionTokens::new(config.auth.jwt_secret.as_bytes()));

    let state = AppState::new(
        db.pool().clone(),
        files,
        tokens,
        config.mail.domain.clone(),
    );

    let app = build_router(state, db.pool().clone(), config.files.max_upload_bytes);

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hq_server=debug,hq_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Build the application router
fn build_router(state: AppState, pool: PgPool, max_upload_bytes: usize) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(pool);

    hq_api::router(state)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(max_upload_bytes))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        // Lazy pool: no live database behind it, so the health check
        // reports the database as down while the route itself stays up.
        let pool = PgPool::connect_lazy("postgres://localhost/branchhq-test")
            .expect("lazy pool");

        let tokens = Arc::new(SessionTokens::new(b"test-secret"));
        let state = AppState::detached(tokens, "example.com");

        build_router(state, pool, 1024 * 1024)
    }

    #[tokio::test]
    async fn test_health_endpoint_responds_without_database() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
