//! Listen Notes podcast directory client.
//!
//! Listen Notes authenticates with an `X-ListenAPI-Key` header. Free plans
//! allow only a handful of requests per second, hence the shared limiter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use super::rate_limiter::SlidingWindowLimiter;
use super::types::{Podcast, SearchQuery, SearchResponse};
use super::{DirectoryError, PodcastDirectory};
use crate::config::DirectoryConfig;
use crate::metrics;

const SERVICE: &str = "listen_notes";

/// Listen Notes API client.
pub struct ListenNotesClient {
    client: Client,
    base_url: String,
    api_key: String,
    limiter: Arc<SlidingWindowLimiter>,
}

impl ListenNotesClient {
    /// Create a new client sharing `limiter` with other callers.
    pub fn new(
        config: &DirectoryConfig,
        limiter: Arc<SlidingWindowLimiter>,
    ) -> Result<Self, DirectoryError> {
        if config.api_key.is_empty() {
            return Err(DirectoryError::NotConfigured(
                "Listen Notes API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            limiter,
        })
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, DirectoryError> {
        self.limiter.wait().await;

        let start = Instant::now();
        let result = request.header("X-ListenAPI-Key", &self.api_key).send().await;

        metrics::EXTERNAL_SERVICE_DURATION
            .with_label_values(&[SERVICE, operation])
            .observe(start.elapsed().as_secs_f64());

        let ok = matches!(&result, Ok(r) if r.status().is_success());
        metrics::EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&[SERVICE, operation, if ok { "success" } else { "error" }])
            .inc();

        Ok(result?)
    }
}

#[async_trait]
impl PodcastDirectory for ListenNotesClient {
    fn name(&self) -> &str {
        "listen_notes"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, DirectoryError> {
        if query.query.trim().is_empty() {
            return Err(DirectoryError::InvalidQuery(
                "query cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/search", self.base_url);

        debug!(
            "Listen Notes search: query='{}', offset={}",
            query.query, query.paging.offset
        );

        let mut params: Vec<(&str, String)> = vec![
            ("q", query.query.clone()),
            ("type", "podcast".to_string()),
            ("offset", query.paging.offset.to_string()),
        ];
        if let Some(size) = query.paging.page_size {
            params.push(("page_size", size.to_string()));
        }
        if query.paging.sort_by_date {
            params.push(("sort_by_date", "1".to_string()));
        }
        if let Some(language) = &query.paging.language {
            params.push(("language", language.clone()));
        }
        if !query.paging.genre_ids.is_empty() {
            let genres: Vec<String> = query
                .paging
                .genre_ids
                .iter()
                .map(|g| g.to_string())
                .collect();
            params.push(("genre_ids", genres.join(",")));
        }

        let response = self
            .send("search", self.client.get(&url).query(&params))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let page: ListenNotesSearchResponse = response.json().await.map_err(|e| {
            DirectoryError::ParseError(format!("Failed to parse search response: {}", e))
        })?;

        let results: Vec<Podcast> = page.results.into_iter().map(Into::into).collect();
        metrics::SEARCH_RESULTS.observe(results.len() as f64);

        debug!(
            "Listen Notes search returned {} of {} podcasts",
            results.len(),
            page.total
        );

        Ok(SearchResponse {
            count: page.count.unwrap_or(results.len() as u32),
            total: page.total,
            next_offset: page.next_offset,
            results,
        })
    }

    async fn get_podcast(&self, id: &str) -> Result<Podcast, DirectoryError> {
        let url = format!("{}/podcasts/{}", self.base_url, urlencoding::encode(id));

        debug!("Listen Notes get podcast: id={}", id);

        let response = self
            .send("get_podcast", self.client.get(&url).query(&[("sort", "recent_first")]))
            .await?;

        let status = response.status();
        if status == 404 {
            return Err(DirectoryError::NotFound(format!("Podcast {}", id)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let podcast: ListenNotesPodcast = response.json().await.map_err(|e| {
            DirectoryError::ParseError(format!("Failed to parse podcast response: {}", e))
        })?;

        Ok(podcast.into())
    }
}

// Listen Notes response shapes

#[derive(Debug, Deserialize)]
struct ListenNotesSearchResponse {
    #[serde(default)]
    count: Option<u32>,
    #[serde(default)]
    total: u32,
    #[serde(default)]
    next_offset: Option<u32>,
    #[serde(default)]
    results: Vec<ListenNotesPodcast>,
}

/// Search results carry `*_original` fields, lookups carry the plain ones.
#[derive(Debug, Deserialize)]
struct ListenNotesPodcast {
    id: String,
    #[serde(alias = "title_original")]
    title: String,
    #[serde(default, alias = "publisher_original")]
    publisher: Option<String>,
    #[serde(default, alias = "description_original")]
    description: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    #[serde(default)]
    total_episodes: Option<u32>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    explicit_content: bool,
}

impl From<ListenNotesPodcast> for Podcast {
    fn from(p: ListenNotesPodcast) -> Self {
        Self {
            id: p.id,
            title: p.title,
            publisher: p.publisher.unwrap_or_default(),
            description: p.description.unwrap_or_default(),
            genre_ids: p.genre_ids,
            total_episodes: p.total_episodes,
            language: p.language,
            website: p.website.filter(|w| !w.is_empty()),
            explicit_content: p.explicit_content,
        }
    }
}
