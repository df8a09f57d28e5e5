//! Podcast directory integration.
//!
//! All outbound directory calls go through a [`SlidingWindowLimiter`] shared
//! by every user of the client.

mod listen_notes;
pub mod rate_limiter;
mod types;

pub use listen_notes::ListenNotesClient;
pub use rate_limiter::{RateLimitError, RateLimitStatus, SlidingWindowLimiter};
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the podcast directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Directory answered with a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request rejected before being sent.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Client not configured (missing API key, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl DirectoryError {
    /// Upstream HTTP status, when the directory produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            DirectoryError::HttpError(e) => e.status().map(|s| s.as_u16()),
            DirectoryError::ApiError { status, .. } => Some(*status),
            DirectoryError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// A searchable podcast directory.
#[async_trait]
pub trait PodcastDirectory: Send + Sync {
    /// Directory name for logs and metrics.
    fn name(&self) -> &str;

    /// Search podcasts. No retry on failure.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, DirectoryError>;

    /// Fetch one podcast by directory ID.
    async fn get_podcast(&self, id: &str) -> Result<Podcast, DirectoryError>;
}
