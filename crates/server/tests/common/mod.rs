//! Common test utilities for API testing with mocks.
//!
//! Builds an in-process router with a mock directory and analyzer and a
//! SQLite saved-match store in a temp directory.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use podmatch_core::{
    load_config_from_str, AnalysisCache, MatchStore, PodcastAnalyzer, PodcastDirectory,
    SqliteMatchStore,
    testing::{MockAnalyzer, MockDirectory},
};

/// Re-export fixtures for test convenience
pub use podmatch_core::testing::fixtures;

/// Test fixture with controllable mocks.
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new().await;
///     fixture.directory.add_podcast(fixtures::podcast("p1", "Founders")).await;
///
///     let response = fixture.post("/api/v1/search", json!({ "query": "founders" })).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock directory - configure search results and failures
    pub directory: Arc<MockDirectory>,
    /// Mock analyzer - configure extracted features
    pub analyzer: Arc<MockAnalyzer>,
    /// Shared analysis cache
    pub cache: Arc<AnalysisCache>,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    /// Raw body, for non-JSON endpoints
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default scoring settings.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = load_config_from_str(&format!(
            r#"
[directory]
api_key = "test-key"

[server]
host = "127.0.0.1"
port = 8080

[database]
path = "{}"
"#,
            db_path.display()
        ))
        .expect("Failed to build test config");

        let directory = Arc::new(MockDirectory::new());
        let analyzer = Arc::new(MockAnalyzer::new());
        let cache = Arc::new(AnalysisCache::new(&config.cache));
        let match_store: Arc<dyn MatchStore> = Arc::new(
            SqliteMatchStore::new(&db_path).expect("Failed to create match store"),
        );

        let state = Arc::new(podmatch_server::state::AppState::new(
            config,
            Arc::clone(&directory) as Arc<dyn PodcastDirectory>,
            Arc::clone(&analyzer) as Arc<dyn PodcastAnalyzer>,
            Arc::clone(&cache),
            match_store,
            None,
        ));

        let router = podmatch_server::api::create_router(state);

        Self {
            router,
            directory,
            analyzer,
            cache,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Save a match for `user_id` and return its id.
    pub async fn save(&self, user_id: &str, podcast_id: &str, score: f32) -> String {
        let response = self
            .post(
                "/api/v1/saved-matches",
                serde_json::json!({
                    "user_id": user_id,
                    "match": fixtures::podcast_match(podcast_id, score),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["id"].as_str().unwrap().to_string()
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
