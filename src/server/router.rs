//! Fixed routes and global layers

use axum::http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE};
use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::state::AppState;
use crate::config::CorsConfig;

/// `GET /health`
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Liveness plus a store ping
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "store": "ok" })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "store": "unavailable" })),
            )
        }
    }
}

/// `GET /api-docs`, serving a document generated once at startup
pub fn docs_routes(document: Arc<Value>) -> Router<AppState> {
    Router::new().route(
        "/api-docs",
        get(move || {
            let document = document.clone();
            async move { Json(document.as_ref().clone()) }
        }),
    )
}

/// CORS from config; no origins means any origin without credentials
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}
