//! Collection API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use podmatch_core::saved::{Collection, SavedMatch};
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::state::AppState;

/// Request body for creating a collection
#[derive(Debug, Deserialize)]
pub struct CreateCollectionBody {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Query parameters for listing collections
#[derive(Debug, Deserialize)]
pub struct ListCollectionsParams {
    pub user_id: String,
}

/// Request body for adding a match to a collection
#[derive(Debug, Deserialize)]
pub struct AddMatchBody {
    pub match_id: String,
}

/// Create a collection
pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCollectionBody>,
) -> Result<(StatusCode, Json<Collection>), ApiError> {
    let collection = state.match_store().create_collection(
        &body.user_id,
        &body.name,
        body.description.as_deref(),
    )?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// List a user's collections
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListCollectionsParams>,
) -> Result<Json<Vec<Collection>>, ApiError> {
    Ok(Json(state.match_store().list_collections(&params.user_id)?))
}

/// Delete a collection (its matches stay saved)
pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.match_store().delete_collection(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a saved match to a collection
pub async fn add_match(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AddMatchBody>,
) -> Result<StatusCode, ApiError> {
    state.match_store().add_to_collection(&id, &body.match_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the matches in a collection
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<SavedMatch>>, ApiError> {
    Ok(Json(state.match_store().collection_matches(&id)?))
}

/// Remove a saved match from a collection
pub async fn remove_match(
    State(state): State<Arc<AppState>>,
    Path((id, match_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    if state.match_store().remove_from_collection(&id, &match_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "Match {} is not in collection {}",
            match_id, id
        )))
    }
}
