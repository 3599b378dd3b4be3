//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;

/// Health report returned by `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// Liveness plus a database ping
pub async fn health_check(State(pool): State<PgPool>) -> Json<HealthReport> {
    let database = match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => "up",
        Err(e) => {
            warn!(error = %e, "Health check database ping failed");
            "down"
        }
    };

    Json(HealthReport {
        status: if database == "up" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
