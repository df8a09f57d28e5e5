use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{cache, collections, handlers, matches, middleware::metrics_middleware, saved, search};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Directory search
        .route("/search", post(search::search))
        .route("/podcasts/{id}", get(search::get_podcast))
        // Matching
        .route("/matches/find", post(matches::find_matches))
        .route("/matches/score", post(matches::score_matches))
        .route("/matches/process", post(matches::process_matches))
        // Analysis cache
        .route("/cache/stats", get(cache::get_stats))
        .route("/cache", delete(cache::clear_cache))
        // Saved matches
        .route("/saved-matches", post(saved::save_match))
        .route("/saved-matches", get(saved::list_saved_matches))
        .route("/saved-matches/{id}", get(saved::get_saved_match))
        .route("/saved-matches/{id}/status", post(saved::update_status))
        .route("/saved-matches/{id}/bookmark", post(saved::set_bookmark))
        .route("/saved-matches/{id}/notes", post(saved::add_note))
        .route("/saved-matches/{id}/notes", get(saved::list_notes))
        .route("/saved-matches/{id}/notes/{note_id}", delete(saved::delete_note))
        .route("/saved-matches/{id}/contacts", post(saved::record_contact))
        .route("/saved-matches/{id}/contacts", get(saved::list_contacts))
        // Collections
        .route("/collections", post(collections::create_collection))
        .route("/collections", get(collections::list_collections))
        .route("/collections/{id}", delete(collections::delete_collection))
        .route("/collections/{id}/matches", post(collections::add_match))
        .route("/collections/{id}/matches", get(collections::list_matches))
        .route(
            "/collections/{id}/matches/{match_id}",
            delete(collections::remove_match),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(metrics_middleware)),
        )
}
