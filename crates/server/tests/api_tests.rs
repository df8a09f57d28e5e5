//! In-process API tests against mock directory and analyzer.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use podmatch_core::DirectoryError;

/// Two shows matching "interview"; p1 has rich features, p2 is bare.
async fn seeded_fixture() -> TestFixture {
    let fixture = TestFixture::new().await;
    fixture
        .directory
        .set_podcasts(vec![
            fixtures::podcast("p1", "Founders Talk"),
            fixtures::podcast("p2", "Garden Hour"),
        ])
        .await;
    fixture
        .analyzer
        .set_features(fixtures::features("p1", "Founders Talk"))
        .await;
    fixture
}

// =============================================================================
// Health and config
// =============================================================================

#[tokio::test]
async fn test_health_without_limiter() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "status", json!("ok"));
    assert!(response.body.get("rate_limit").is_none());
}

#[tokio::test]
async fn test_config_hides_api_key() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert!(!response.text.contains("test-key"));
    assert_eq!(response.body["directory"]["api_key_configured"], json!(true));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/nope").await;

    assert_status!(response, StatusCode::NOT_FOUND);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_second_call_is_cached() {
    let fixture = seeded_fixture().await;

    let first = fixture
        .post("/api/v1/search", json!({ "query": "interview" }))
        .await;
    assert_status!(first, StatusCode::OK);
    assert_json_path!(first.body, "count", json!(2));
    assert_json_path!(first.body, "cached", json!(false));

    let second = fixture
        .post("/api/v1/search", json!({ "query": "interview" }))
        .await;
    assert_status!(second, StatusCode::OK);
    assert_json_path!(second.body, "cached", json!(true));
    assert_eq!(second.body["results"], first.body["results"]);

    assert_eq!(fixture.directory.search_count().await, 1);
}

#[tokio::test]
async fn test_search_empty_query_is_422() {
    let fixture = TestFixture::new().await;

    let response = fixture.post("/api/v1/search", json!({ "query": "  " })).await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_search_upstream_failure_is_502() {
    let fixture = TestFixture::new().await;
    fixture
        .directory
        .set_next_error(DirectoryError::ApiError {
            status: 500,
            message: "upstream down".to_string(),
        })
        .await;

    let response = fixture
        .post("/api/v1/search", json!({ "query": "interview" }))
        .await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_search_malformed_json_is_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_raw("/api/v1/search", "{ not json").await;

    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_get_podcast_by_id() {
    let fixture = seeded_fixture().await;

    let found = fixture.get("/api/v1/podcasts/p2").await;
    assert_status!(found, StatusCode::OK);
    assert_json_path!(found.body, "title", json!("Garden Hour"));

    let missing = fixture.get("/api/v1/podcasts/nope").await;
    assert_status!(missing, StatusCode::NOT_FOUND);

    assert_eq!(fixture.directory.recorded_lookups().await, vec!["p2", "nope"]);
}

// =============================================================================
// Matching
// =============================================================================

#[tokio::test]
async fn test_find_matches_ranks_and_reports() {
    let fixture = seeded_fixture().await;

    let response = fixture
        .post(
            "/api/v1/matches/find",
            json!({
                "author": fixtures::author("a1"),
                "query": { "query": "interview" },
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    let body = &response.body;
    assert_json_path!(body, "search_cached", json!(false));
    assert_json_path!(body, "analyses_computed", json!(2));
    assert_json_path!(body, "skipped", json!(0));

    let top = body["results"]["top_matches"].as_array().unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0]["podcast_id"], json!("p1"));
    assert!(top[0]["overall_score"].as_f64().unwrap() > top[1]["overall_score"].as_f64().unwrap());
}

#[tokio::test]
async fn test_find_matches_reuses_cached_analyses() {
    let fixture = seeded_fixture().await;
    let body = json!({
        "author": fixtures::author("a1"),
        "query": { "query": "interview" },
    });

    fixture.post("/api/v1/matches/find", body.clone()).await;
    let response = fixture.post("/api/v1/matches/find", body).await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "search_cached", json!(true));
    assert_json_path!(response.body, "analyses_cached", json!(2));
    assert_eq!(fixture.analyzer.call_count().await, 2);
}

#[tokio::test]
async fn test_find_matches_skips_failed_analysis() {
    let fixture = seeded_fixture().await;
    fixture.analyzer.fail_for("p2").await;

    let response = fixture
        .post(
            "/api/v1/matches/find",
            json!({
                "author": fixtures::author("a1"),
                "query": { "query": "interview" },
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "skipped", json!(1));
    assert_eq!(response.body["results"]["total_matches"], json!(1));
}

#[tokio::test]
async fn test_score_matches_orders_by_score() {
    let fixture = TestFixture::new().await;
    let bare = podmatch_core::PodcastFeatures {
        podcast_id: "p2".to_string(),
        title: "Garden Hour".to_string(),
        ..Default::default()
    };

    let response = fixture
        .post(
            "/api/v1/matches/score",
            json!({
                "author": fixtures::author("a1"),
                "podcasts": [bare, fixtures::features("p1", "Founders Talk")],
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total_matches", json!(2));
    assert_eq!(response.body["top_matches"][0]["podcast_id"], json!("p1"));
    assert!(response.body["applied_filters"]
        .as_array()
        .unwrap()
        .contains(&json!("style-fit")));
}

#[tokio::test]
async fn test_process_matches_aggregates() {
    let fixture = TestFixture::new().await;
    let mut low = fixtures::podcast_match("p2", 0.4);
    low.confidence = 0.5;

    let response = fixture
        .post(
            "/api/v1/matches/process",
            json!({ "matches": [fixtures::podcast_match("p1", 0.9), low] }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "total_matches", json!(2));
    let avg = response.body["average_confidence"].as_f64().unwrap();
    assert!((avg - 0.75).abs() < 1e-6, "average {}", avg);
    // Input order is kept
    assert_eq!(response.body["top_matches"][1]["podcast_id"], json!("p2"));
}

#[tokio::test]
async fn test_process_matches_rejects_negative_score() {
    let fixture = TestFixture::new().await;
    let mut bad = fixtures::podcast_match("p2", 0.4);
    bad.overall_score = -0.1;

    let response = fixture
        .post(
            "/api/v1/matches/process",
            json!({ "matches": [fixtures::podcast_match("p1", 0.9), bad] }),
        )
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body["error"].as_str().unwrap().contains("p2"));
}

// =============================================================================
// Cache
// =============================================================================

#[tokio::test]
async fn test_cache_stats_and_clear() {
    let fixture = seeded_fixture().await;
    fixture
        .post("/api/v1/search", json!({ "query": "interview" }))
        .await;
    fixture
        .post("/api/v1/search", json!({ "query": "interview" }))
        .await;

    let stats = fixture.get("/api/v1/cache/stats").await;
    assert_status!(stats, StatusCode::OK);
    assert_json_path!(stats.body, "size", json!(1));
    assert_json_path!(stats.body, "hits", json!(1));
    assert_json_path!(stats.body, "misses", json!(1));
    assert_json_path!(stats.body, "hit_rate", json!(0.5));

    let cleared = fixture.delete("/api/v1/cache").await;
    assert_status!(cleared, StatusCode::OK);
    assert_json_path!(cleared.body, "removed", json!(1));

    assert_eq!(fixture.cache.stats().size, 0);
}

#[tokio::test]
async fn test_cache_clear_by_prefix_keeps_other_keys() {
    let fixture = seeded_fixture().await;
    fixture
        .post(
            "/api/v1/matches/find",
            json!({
                "author": fixtures::author("a1"),
                "query": { "query": "interview" },
            }),
        )
        .await;
    assert_eq!(fixture.cache.stats().size, 3);

    let cleared = fixture.delete("/api/v1/cache?prefix=no-such-prefix:").await;

    assert_status!(cleared, StatusCode::OK);
    assert_json_path!(cleared.body, "removed", json!(0));
    assert_eq!(fixture.cache.stats().size, 3);
}

// =============================================================================
// Saved matches
// =============================================================================

#[tokio::test]
async fn test_saved_match_lifecycle() {
    let fixture = TestFixture::new().await;
    let id = fixture.save("u1", "p1", 0.8).await;

    let fetched = fixture.get(&format!("/api/v1/saved-matches/{}", id)).await;
    assert_status!(fetched, StatusCode::OK);
    assert_eq!(fetched.body["status"]["status"], json!("viewed"));
    assert_json_path!(fetched.body, "bookmarked", json!(false));

    let pending = fixture
        .post(
            &format!("/api/v1/saved-matches/{}/status", id),
            json!({ "status": "pending" }),
        )
        .await;
    assert_status!(pending, StatusCode::OK);
    assert_eq!(pending.body["status"]["status"], json!("pending"));

    // Backwards is refused
    let back = fixture
        .post(
            &format!("/api/v1/saved-matches/{}/status", id),
            json!({ "status": "contacted" }),
        )
        .await;
    assert_status!(back, StatusCode::CONFLICT);

    let rejected = fixture
        .post(
            &format!("/api/v1/saved-matches/{}/status", id),
            json!({ "status": "rejected", "reason": "no_response" }),
        )
        .await;
    assert_status!(rejected, StatusCode::OK);
    assert_eq!(rejected.body["status"]["reason"], json!("no_response"));

    // Terminal
    let after = fixture
        .post(
            &format!("/api/v1/saved-matches/{}/status", id),
            json!({ "status": "scheduled" }),
        )
        .await;
    assert_status!(after, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_saving_twice_updates_in_place() {
    let fixture = TestFixture::new().await;
    let first = fixture.save("u1", "p1", 0.6).await;
    let second = fixture.save("u1", "p1", 0.9).await;

    assert_eq!(first, second);

    let listed = fixture.get("/api/v1/saved-matches?user_id=u1").await;
    assert_status!(listed, StatusCode::OK);
    assert_json_path!(listed.body, "total", json!(1));
    let score = listed.body["matches"][0]["overall_score"].as_f64().unwrap();
    assert!((score - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn test_list_saved_matches_filters() {
    let fixture = TestFixture::new().await;
    let a = fixture.save("u1", "p1", 0.8).await;
    fixture.save("u1", "p2", 0.7).await;
    fixture.save("u2", "p1", 0.5).await;

    fixture
        .post(
            &format!("/api/v1/saved-matches/{}/bookmark", a),
            json!({ "bookmarked": true }),
        )
        .await;

    let bookmarked = fixture
        .get("/api/v1/saved-matches?user_id=u1&bookmarked=true")
        .await;
    assert_status!(bookmarked, StatusCode::OK);
    assert_json_path!(bookmarked.body, "total", json!(1));
    assert_eq!(bookmarked.body["matches"][0]["id"], json!(a));

    let viewed = fixture.get("/api/v1/saved-matches?status=viewed").await;
    assert_json_path!(viewed.body, "total", json!(3));

    let page = fixture.get("/api/v1/saved-matches?limit=2&offset=2").await;
    assert_json_path!(page.body, "total", json!(3));
    assert_json_path!(page.body, "limit", json!(2));
    assert_eq!(page.body["matches"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_saved_match_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/saved-matches/missing").await;
    assert_status!(response, StatusCode::NOT_FOUND);

    let status = fixture
        .post(
            "/api/v1/saved-matches/missing/status",
            json!({ "status": "contacted" }),
        )
        .await;
    assert_status!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_save_with_empty_user_is_422() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post(
            "/api/v1/saved-matches",
            json!({ "user_id": "", "match": fixtures::podcast_match("p1", 0.5) }),
        )
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_notes_add_list_delete() {
    let fixture = TestFixture::new().await;
    let id = fixture.save("u1", "p1", 0.8).await;
    let notes_path = format!("/api/v1/saved-matches/{}/notes", id);

    let added = fixture
        .post(&notes_path, json!({ "body": "  Host replied on Twitter  " }))
        .await;
    assert_status!(added, StatusCode::CREATED);
    assert_json_path!(added.body, "body", json!("Host replied on Twitter"));
    let note_id = added.body["id"].as_str().unwrap().to_string();

    let empty = fixture.post(&notes_path, json!({ "body": "   " })).await;
    assert_status!(empty, StatusCode::UNPROCESSABLE_ENTITY);

    let listed = fixture.get(&notes_path).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let deleted = fixture
        .delete(&format!("{}/{}", notes_path, note_id))
        .await;
    assert_status!(deleted, StatusCode::NO_CONTENT);

    let again = fixture
        .delete(&format!("{}/{}", notes_path, note_id))
        .await;
    assert_status!(again, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_note_through_other_match_is_404() {
    let fixture = TestFixture::new().await;
    let a = fixture.save("u1", "p1", 0.8).await;
    let b = fixture.save("u1", "p2", 0.7).await;

    let added = fixture
        .post(
            &format!("/api/v1/saved-matches/{}/notes", b),
            json!({ "body": "Only on b" }),
        )
        .await;
    let note_id = added.body["id"].as_str().unwrap().to_string();

    let wrong = fixture
        .delete(&format!("/api/v1/saved-matches/{}/notes/{}", a, note_id))
        .await;
    assert_status!(wrong, StatusCode::NOT_FOUND);

    let notes = fixture
        .get(&format!("/api/v1/saved-matches/{}/notes", b))
        .await;
    assert_eq!(notes.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_save_out_of_range_match_is_422() {
    let fixture = TestFixture::new().await;
    let mut bad = fixtures::podcast_match("p1", 0.5);
    bad.factors.topic = 5.0;

    let response = fixture
        .post(
            "/api/v1/saved-matches",
            json!({ "user_id": "u1", "match": bad }),
        )
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    let listed = fixture.get("/api/v1/saved-matches?user_id=u1").await;
    assert_json_path!(listed.body, "total", json!(0));
}

#[tokio::test]
async fn test_contact_advances_viewed_match() {
    let fixture = TestFixture::new().await;
    let id = fixture.save("u1", "p1", 0.8).await;
    let contacts_path = format!("/api/v1/saved-matches/{}/contacts", id);

    let recorded = fixture
        .post(
            &contacts_path,
            json!({ "channel": "email", "summary": "Pitched the book" }),
        )
        .await;
    assert_status!(recorded, StatusCode::CREATED);
    assert_json_path!(recorded.body, "channel", json!("email"));

    let fetched = fixture.get(&format!("/api/v1/saved-matches/{}", id)).await;
    assert_eq!(fetched.body["status"]["status"], json!("contacted"));

    let listed = fixture.get(&contacts_path).await;
    assert_status!(listed, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
}

// =============================================================================
// Collections
// =============================================================================

#[tokio::test]
async fn test_collection_lifecycle() {
    let fixture = TestFixture::new().await;
    let match_id = fixture.save("u1", "p1", 0.8).await;

    let created = fixture
        .post(
            "/api/v1/collections",
            json!({ "user_id": "u1", "name": "Launch week" }),
        )
        .await;
    assert_status!(created, StatusCode::CREATED);
    let collection_id = created.body["id"].as_str().unwrap().to_string();

    let duplicate = fixture
        .post(
            "/api/v1/collections",
            json!({ "user_id": "u1", "name": "Launch week" }),
        )
        .await;
    assert_status!(duplicate, StatusCode::CONFLICT);

    let items_path = format!("/api/v1/collections/{}/matches", collection_id);
    let added = fixture
        .post(&items_path, json!({ "match_id": match_id }))
        .await;
    assert_status!(added, StatusCode::NO_CONTENT);

    let listed = fixture.get(&items_path).await;
    assert_status!(listed, StatusCode::OK);
    assert_eq!(listed.body[0]["id"], json!(match_id));

    let removed = fixture
        .delete(&format!("{}/{}", items_path, match_id))
        .await;
    assert_status!(removed, StatusCode::NO_CONTENT);

    let missing = fixture
        .delete(&format!("{}/{}", items_path, match_id))
        .await;
    assert_status!(missing, StatusCode::NOT_FOUND);

    let collections = fixture.get("/api/v1/collections?user_id=u1").await;
    assert_eq!(collections.body.as_array().unwrap().len(), 1);

    let deleted = fixture
        .delete(&format!("/api/v1/collections/{}", collection_id))
        .await;
    assert_status!(deleted, StatusCode::NO_CONTENT);

    // The saved match outlives its collection
    let fetched = fixture
        .get(&format!("/api/v1/saved-matches/{}", match_id))
        .await;
    assert_status!(fetched, StatusCode::OK);
}

#[tokio::test]
async fn test_collection_rejects_other_users_match() {
    let fixture = TestFixture::new().await;
    let foreign = fixture.save("u2", "p1", 0.8).await;

    let created = fixture
        .post("/api/v1/collections", json!({ "user_id": "u1", "name": "Mine" }))
        .await;
    let collection_id = created.body["id"].as_str().unwrap().to_string();

    let response = fixture
        .post(
            &format!("/api/v1/collections/{}/matches", collection_id),
            json!({ "match_id": foreign }),
        )
        .await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_metrics_exposition() {
    let fixture = TestFixture::new().await;
    fixture.save("u1", "p1", 0.8).await;
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;

    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("podmatch_http_requests_total"));
    assert!(response.text.contains("podmatch_saved_matches_by_status"));
    assert!(response.text.contains("podmatch_cache_entries"));
}
