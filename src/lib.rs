//! Query cache
//!
//! Caches expensive query results in a shared Redis instance and keeps
//! serving from an in-process store when Redis is unavailable:
//! - Deterministic keys derived from a namespace and parameter set
//! - Per-entry TTL in both tiers
//! - Pattern invalidation, stats and health reporting
//! - HTTP admin surface and CLI

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{CacheError, CacheParams};
pub use infrastructure::cache::{cache_control_value, CacheConfig, CacheManager};

use std::sync::Arc;

use api::state::AppState;

/// Create the application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let cache = CacheManager::init(&config.cache).await?;
    Ok(AppState::new(Arc::new(cache)))
}
