//! Directory search API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use podmatch_core::directory::{PagingOptions, Podcast, SearchQuery};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Search request body, shared with the match endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub sort_by_date: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl From<SearchRequest> for SearchQuery {
    fn from(request: SearchRequest) -> Self {
        SearchQuery {
            query: request.query,
            paging: PagingOptions {
                offset: request.offset,
                page_size: request.page_size,
                sort_by_date: request.sort_by_date,
                language: request.language,
                genre_ids: request.genre_ids,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<Podcast>,
    pub count: u32,
    pub total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u32>,
    /// Whether the page was served from the analysis cache.
    pub cached: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Search the podcast directory.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = SearchQuery::from(body);
    let (page, cached) = state.pipeline().search(&query).await?;

    Ok(Json(SearchResponse {
        results: page.results,
        count: page.count,
        total: page.total,
        next_offset: page.next_offset,
        cached,
    }))
}

/// Look up one podcast by directory ID.
pub async fn get_podcast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Podcast>, ApiError> {
    Ok(Json(state.pipeline().podcast(&id).await?))
}
