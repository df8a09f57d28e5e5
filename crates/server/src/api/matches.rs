//! Matching API handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use podmatch_core::directory::SearchQuery;
use podmatch_core::matching::{AuthorProfile, MatchReport, PodcastFeatures, PodcastMatch};
use podmatch_core::results::ProcessedResults;
use serde::Deserialize;

use super::error::ApiError;
use super::search::SearchRequest;
use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

/// Request body for a full search-analyze-score run
#[derive(Debug, Deserialize)]
pub struct FindMatchesRequest {
    pub author: AuthorProfile,
    pub query: SearchRequest,
}

/// Request body for scoring caller-supplied features
#[derive(Debug, Deserialize)]
pub struct ScoreMatchesRequest {
    pub author: AuthorProfile,
    pub podcasts: Vec<PodcastFeatures>,
}

/// Request body for validating and aggregating a batch
#[derive(Debug, Deserialize)]
pub struct ProcessMatchesRequest {
    pub matches: Vec<PodcastMatch>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Search the directory and rank the results for an author.
pub async fn find_matches(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FindMatchesRequest>,
) -> Result<Json<MatchReport>, ApiError> {
    let query = SearchQuery::from(body.query);
    let report = state.pipeline().find_matches(&body.author, &query).await?;
    Ok(Json(report))
}

/// Score already analyzed podcasts for an author.
pub async fn score_matches(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScoreMatchesRequest>,
) -> Result<Json<ProcessedResults>, ApiError> {
    let pipeline = state.pipeline();
    let matches = pipeline.scorer().score_all(&body.author, &body.podcasts);
    let results = pipeline.processor().process_results(matches)?;
    Ok(Json(results))
}

/// Validate and aggregate a batch of matches.
pub async fn process_matches(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProcessMatchesRequest>,
) -> Result<Json<ProcessedResults>, ApiError> {
    let results = state.pipeline().processor().process_results(body.matches)?;
    Ok(Json(results))
}
