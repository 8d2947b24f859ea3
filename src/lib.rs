//! E-commerce admin API library
//!
//! Catalog, inventory, sales and revenue analytics behind an axum router.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{http::HeaderValue, routing::get, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::{sync::Arc, time::Duration, time::Instant};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: config::AppConfig) -> Self {
        Self {
            db: Arc::new(db),
            config,
            started_at: Instant::now(),
        }
    }
}

/// Envelope for every successful API response.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339, taken when the envelope is built
    pub timestamp: String,
}

impl ResponseMeta {
    fn now() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|id| id.to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::now()),
        }
    }
}

/// Every resource router, relative to `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::categories::category_routes())
        .merge(handlers::products::product_routes())
        .merge(handlers::inventory::inventory_routes())
        .merge(handlers::sales::sales_routes())
        .merge(handlers::analytics::analytics_routes())
}

fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(environment = %cfg.environment, "no CORS origins listed, allowing any origin");
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("no CORS origins listed, cross-origin requests are rejected");
        CorsLayer::new()
    }
}

/// Assembles the full application: health probes, the OpenAPI document and
/// the versioned API, wrapped in the request id, tracing, CORS, compression
/// and timeout layers.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(|| async { "ecommerce-admin-api up" }))
        .merge(health::health_routes())
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
}
