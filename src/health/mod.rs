//! Liveness, readiness and build information endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ReadinessReport {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(simple_health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/version", get(version_info))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running")),
    tag = "Health"
)]
pub async fn simple_health_check() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Database reachable", body = ReadinessReport),
        (status = 503, description = "Database unreachable", body = ReadinessReport)
    ),
    tag = "Health"
)]
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    let database = match crate::db::check_connection(&state.db).await {
        Ok(()) => HealthStatus::Up,
        Err(e) => {
            error!("Readiness check failed: {}", e);
            HealthStatus::Down
        }
    };

    let code = if database == HealthStatus::Up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let report = ReadinessReport {
        status: database.clone(),
        database,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    };
    (code, Json(report)).into_response()
}

#[utoipa::path(
    get,
    path = "/health/version",
    responses((status = 200, description = "Build information")),
    tag = "Health"
)]
pub async fn version_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "commit": option_env!("GIT_HASH").unwrap_or("unknown"),
    }))
}
