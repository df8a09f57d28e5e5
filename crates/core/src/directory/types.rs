//! Podcast directory types.

use serde::{Deserialize, Serialize};

/// Paging and filtering options for a directory search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingOptions {
    /// Offset of the first result.
    #[serde(default)]
    pub offset: u32,
    /// Results per page (directory default when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Newest first instead of relevance.
    #[serde(default)]
    pub sort_by_date: bool,
    /// Restrict to one language (e.g. "English").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Restrict to directory genre ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genre_ids: Vec<u32>,
}

/// A podcast search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query.
    pub query: String,
    #[serde(default)]
    pub paging: PagingOptions,
}

impl SearchQuery {
    /// Query for the first page with default paging.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            paging: PagingOptions::default(),
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.paging.offset = offset;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.paging.page_size = Some(page_size);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.paging.language = Some(language.into());
        self
    }

    pub fn with_genres(mut self, genre_ids: Vec<u32>) -> Self {
        self.paging.genre_ids = genre_ids;
        self
    }
}

/// A podcast as listed by the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Podcast {
    /// Directory podcast ID.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_episodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub explicit_content: bool,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Podcast>,
    /// Results on this page.
    pub count: u32,
    /// Total results across all pages.
    pub total: u32,
    /// Offset of the next page, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u32>,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            count: 0,
            total: 0,
            next_offset: None,
        }
    }
}
