use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

use super::cache;
use super::health;
use super::state::AppState;

/// Create the router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .merge(cache::create_cache_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Create the router, exposing Prometheus metrics at `metrics_path` when enabled
pub fn create_router_with_metrics(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    metrics_path: &str,
) -> Router {
    let router = create_router(state);

    match metrics {
        Some(m) => router.merge(create_metrics_router(m, metrics_path)),
        None => router,
    }
}
