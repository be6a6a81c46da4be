//! Observability infrastructure - Prometheus metrics for the cache

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_cache_lookup, record_invalidation,
    record_remote_failure, CacheTier, LookupOutcome, PrometheusMetrics,
};
