//! Saved match API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use podmatch_core::matching::PodcastMatch;
use podmatch_core::saved::{
    ContactRecord, MatchStatus, Note, RecordContactRequest, SavedMatch, SavedMatchFilter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::state::AppState;

/// Maximum allowed limit for saved match queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for saved match queries
const DEFAULT_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for saving a match
#[derive(Debug, Deserialize)]
pub struct SaveMatchBody {
    pub user_id: String,
    #[serde(rename = "match")]
    pub podcast_match: PodcastMatch,
}

/// Query parameters for listing saved matches
#[derive(Debug, Deserialize)]
pub struct ListSavedMatchesParams {
    pub user_id: Option<String>,
    /// Filter by status type
    pub status: Option<String>,
    pub bookmarked: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Response for listing saved matches
#[derive(Debug, Serialize)]
pub struct ListSavedMatchesResponse {
    pub matches: Vec<SavedMatch>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Request body for setting the bookmark flag
#[derive(Debug, Deserialize)]
pub struct BookmarkBody {
    pub bookmarked: bool,
}

/// Request body for adding a note
#[derive(Debug, Deserialize)]
pub struct AddNoteBody {
    pub body: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Save a match, or refresh the score of one already saved
pub async fn save_match(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveMatchBody>,
) -> Result<(StatusCode, Json<SavedMatch>), ApiError> {
    let saved = state
        .match_store()
        .record_match(&body.user_id, &body.podcast_match)?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// List saved matches with optional filters
pub async fn list_saved_matches(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListSavedMatchesParams>,
) -> Result<Json<ListSavedMatchesResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = SavedMatchFilter::new().with_limit(limit).with_offset(offset);

    if let Some(ref user_id) = params.user_id {
        filter = filter.with_user(user_id);
    }

    if let Some(ref status) = params.status {
        filter = filter.with_status(status);
    }

    if let Some(bookmarked) = params.bookmarked {
        filter = filter.with_bookmarked(bookmarked);
    }

    let store = state.match_store();
    let matches = store.list(&filter)?;
    let total = store.count(&filter)?;

    Ok(Json(ListSavedMatchesResponse {
        matches,
        total,
        limit,
        offset,
    }))
}

/// Get a saved match by ID
pub async fn get_saved_match(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SavedMatch>, ApiError> {
    match state.match_store().get(&id)? {
        Some(saved) => Ok(Json(saved)),
        None => Err(ApiError::not_found(format!("Saved match not found: {}", id))),
    }
}

/// Move a saved match to a new status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(status): Json<MatchStatus>,
) -> Result<Json<SavedMatch>, ApiError> {
    Ok(Json(state.match_store().update_status(&id, status)?))
}

/// Set or clear the bookmark flag
pub async fn set_bookmark(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<BookmarkBody>,
) -> Result<Json<SavedMatch>, ApiError> {
    Ok(Json(state.match_store().set_bookmark(&id, body.bookmarked)?))
}

/// Add a note to a saved match
pub async fn add_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AddNoteBody>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let note = state.match_store().add_note(&id, &body.body)?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// List notes on a saved match
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.match_store().list_notes(&id)?))
}

/// Delete a note
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path((id, note_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.match_store().delete_note(&id, &note_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Log an outreach attempt
pub async fn record_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<RecordContactRequest>,
) -> Result<(StatusCode, Json<ContactRecord>), ApiError> {
    let record = state.match_store().record_contact(&id, body)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// List outreach attempts on a saved match
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ContactRecord>>, ApiError> {
    Ok(Json(state.match_store().list_contacts(&id)?))
}
