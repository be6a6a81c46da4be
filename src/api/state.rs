//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::cache::CacheManager;

/// Application state shared by request handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: Arc<CacheManager>,
}

impl AppState {
    pub fn new(cache: Arc<CacheManager>) -> Self {
        Self { cache }
    }
}
