//! Analysis cache API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use podmatch_core::CacheStats;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate: f64,
}

/// Query parameters for clearing the cache
#[derive(Debug, Deserialize)]
pub struct ClearCacheParams {
    /// Only drop keys starting with this prefix (e.g. "analysis:").
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub removed: usize,
}

/// Get cache statistics
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    let stats = state.cache().stats();
    let hit_rate = stats.hit_rate();
    Json(CacheStatsResponse { stats, hit_rate })
}

/// Clear the cache, or the part of it under a key prefix
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClearCacheParams>,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    let result = match params.prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => state.cache().invalidate_prefix(prefix),
        _ => state.cache().clear(),
    };

    let removed = result.map_err(|e| {
        ApiError::new(axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(ClearCacheResponse { removed }))
}
