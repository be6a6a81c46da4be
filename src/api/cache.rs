//! Cache administration endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

use crate::domain::{CacheParams, CacheStats, InvalidationSummary, ParamValue};

use super::state::AppState;
use super::types::ApiError;

/// Create the cache administration router
pub fn create_cache_router() -> Router<AppState> {
    Router::new()
        .route("/cache", delete(clear_cache))
        .route("/cache/stats", get(get_stats))
        .route("/cache/pattern/{pattern}", delete(invalidate_pattern))
        .route("/cache/{namespace}", delete(delete_entry))
}

/// Converts query-string pairs into typed cache parameters
pub fn params_from_query(query: HashMap<String, String>) -> CacheParams {
    query
        .into_iter()
        .map(|(name, raw)| (name, ParamValue::infer(&raw)))
        .collect()
}

async fn get_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.get_stats().await)
}

async fn clear_cache(
    State(state): State<AppState>,
) -> Result<Json<InvalidationSummary>, ApiError> {
    let summary = state.cache.clear_all().await?;
    Ok(Json(summary))
}

async fn invalidate_pattern(
    State(state): State<AppState>,
    Path(pattern): Path<String>,
) -> Result<Json<InvalidationSummary>, ApiError> {
    let summary = state
        .cache
        .delete_pattern(&pattern)
        .await
        .map_err(|e| ApiError::from(e).with_param("pattern"))?;

    Ok(Json(summary))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<StatusCode, ApiError> {
    let params = params_from_query(query);
    state.cache.delete(&namespace, &params).await?;

    Ok(StatusCode::NO_CONTENT)
}
