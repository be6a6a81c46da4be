//! Prometheus metrics infrastructure

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Tier that answered a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Remote,
    Local,
}

impl CacheTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTier::Remote => "remote",
            CacheTier::Local => "local",
        }
    }
}

/// Result of a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::Hit => "hit",
            LookupOutcome::Miss => "miss",
        }
    }
}

/// Record a cache lookup
pub fn record_cache_lookup(tier: CacheTier, outcome: LookupOutcome) {
    counter!(
        "cache_requests_total",
        "tier" => tier.as_str(),
        "result" => outcome.as_str()
    )
    .increment(1);
}

/// Record a remote call that fell back to the local tier
pub fn record_remote_failure(operation: &'static str) {
    counter!("cache_remote_failures_total", "operation" => operation).increment(1);
}

/// Record a bulk invalidation and the number of entries it removed
pub fn record_invalidation(kind: &'static str, removed: u64) {
    counter!("cache_invalidations_total", "kind" => kind).increment(1);
    counter!("cache_invalidated_entries_total", "kind" => kind).increment(removed);
}
