//! Mock podcast directory for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::directory::{
    DirectoryError, Podcast, PodcastDirectory, SearchQuery, SearchResponse,
};

/// Page size used when a query does not set one.
const DEFAULT_PAGE_SIZE: u32 = 10;

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The query that was searched.
    pub query: SearchQuery,
    /// When the search was made.
    pub timestamp: Instant,
}

/// Mock implementation of the [`PodcastDirectory`] trait.
///
/// - Returns configured podcasts whose title or description contains every
///   query word
/// - Pages results by the query's offset and page size
/// - Records queries for assertions
/// - Fails the next call with an injected error
///
/// # Example
///
/// ```rust,ignore
/// use podmatch_core::testing::{fixtures, MockDirectory};
///
/// let directory = MockDirectory::new();
/// directory.set_podcasts(vec![fixtures::podcast("pod-1", "Founders Talk")]).await;
///
/// let page = directory.search(&SearchQuery::new("founders")).await?;
/// assert_eq!(page.results.len(), 1);
/// assert_eq!(directory.search_count().await, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockDirectory {
    podcasts: Arc<RwLock<Vec<Podcast>>>,
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    lookups: Arc<RwLock<Vec<String>>>,
    /// If set, the next call fails with this error.
    next_error: Arc<RwLock<Option<DirectoryError>>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the podcasts this directory knows.
    pub async fn set_podcasts(&self, podcasts: Vec<Podcast>) {
        *self.podcasts.write().await = podcasts;
    }

    pub async fn add_podcast(&self, podcast: Podcast) {
        self.podcasts.write().await.push(podcast);
    }

    /// Get recorded search queries.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// IDs passed to `get_podcast`, in call order.
    pub async fn recorded_lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: DirectoryError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<DirectoryError> {
        self.next_error.write().await.take()
    }

    fn matches(podcast: &Podcast, words: &[String]) -> bool {
        let haystack = format!("{} {}", podcast.title, podcast.description).to_lowercase();
        words.iter().all(|w| haystack.contains(w.as_str()))
    }
}

#[async_trait]
impl PodcastDirectory for MockDirectory {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, DirectoryError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.searches.write().await.push(RecordedSearch {
            query: query.clone(),
            timestamp: Instant::now(),
        });

        if query.query.trim().is_empty() {
            return Err(DirectoryError::InvalidQuery(
                "query cannot be empty".to_string(),
            ));
        }

        let words: Vec<String> = query
            .query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let podcasts = self.podcasts.read().await;
        let found: Vec<Podcast> = podcasts
            .iter()
            .filter(|p| Self::matches(p, &words))
            .filter(|p| {
                query.paging.genre_ids.is_empty()
                    || p.genre_ids.iter().any(|g| query.paging.genre_ids.contains(g))
            })
            .cloned()
            .collect();

        let total = found.len() as u32;
        let offset = query.paging.offset;
        let page_size = query.paging.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        let results: Vec<Podcast> = found
            .into_iter()
            .skip(offset as usize)
            .take(page_size as usize)
            .collect();

        let end = offset + results.len() as u32;
        Ok(SearchResponse {
            count: results.len() as u32,
            total,
            next_offset: (end < total).then_some(end),
            results,
        })
    }

    async fn get_podcast(&self, id: &str) -> Result<Podcast, DirectoryError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.lookups.write().await.push(id.to_string());

        self.podcasts
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("podcast {}", id)))
    }
}
