//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::domain::CacheHealth;

use super::state::AppState;

/// Health response wrapping the cache report
#[derive(Serialize)]
pub struct HealthResponse {
    pub version: String,
    pub latency_ms: u64,
    #[serde(flatten)]
    pub cache: CacheHealth,
}

/// Cache health; degraded still answers 200 since the local tier keeps serving
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let cache = state.cache.health_check().await;

    let response = HealthResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        latency_ms: start.elapsed().as_millis() as u64,
        cache,
    };

    (StatusCode::OK, Json(response))
}

/// Liveness probe - always returns 200 if the process is running
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
