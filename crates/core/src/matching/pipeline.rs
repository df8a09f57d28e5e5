//! End-to-end matching: search, analyze (cached), score, process.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::config::PipelineConfig;
use super::scorer::CompatibilityScorer;
use super::types::{AuthorProfile, PodcastFeatures};
use crate::analysis::PodcastAnalyzer;
use crate::cache::keys::{analysis_fingerprint, search_fingerprint};
use crate::cache::{AnalysisCache, CachedValue};
use crate::directory::{DirectoryError, Podcast, PodcastDirectory, SearchQuery, SearchResponse};
use crate::metrics;
use crate::results::{ProcessedResults, ResultsProcessor, ValidationError};

/// Errors that abort a pipeline run. Cache and analysis failures never do.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Directory search failed: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Match validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Outcome of one `find_matches` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub query: SearchQuery,
    /// Podcasts the directory knows for this query, across all pages.
    pub total_available: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u32>,
    pub search_cached: bool,
    pub analyses_cached: usize,
    pub analyses_computed: usize,
    /// Podcasts the analyzer could not handle.
    pub skipped: usize,
    pub results: ProcessedResults,
}

/// Wires directory, analyzer, cache, scorer and processor together.
pub struct MatchPipeline {
    directory: Arc<dyn PodcastDirectory>,
    analyzer: Arc<dyn PodcastAnalyzer>,
    cache: Arc<AnalysisCache>,
    scorer: CompatibilityScorer,
    processor: ResultsProcessor,
    config: PipelineConfig,
}

impl MatchPipeline {
    pub fn new(
        directory: Arc<dyn PodcastDirectory>,
        analyzer: Arc<dyn PodcastAnalyzer>,
        cache: Arc<AnalysisCache>,
        scorer: CompatibilityScorer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            directory,
            analyzer,
            cache,
            scorer,
            processor: ResultsProcessor::new(),
            config,
        }
    }

    pub fn scorer(&self) -> &CompatibilityScorer {
        &self.scorer
    }

    pub fn processor(&self) -> &ResultsProcessor {
        &self.processor
    }

    /// Search the directory, served from cache when possible.
    ///
    /// Returns the page and whether it came from cache.
    pub async fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<(SearchResponse, bool), DirectoryError> {
        let key = search_fingerprint(query);
        if let Some(page) = self.cache.lookup_search(&key) {
            debug!(query = %query.query, "Search served from cache");
            return Ok((page, true));
        }

        let page = self.directory.search(query).await?;
        self.cache.store(
            &key,
            CachedValue::Search(page.clone()),
            Some(Duration::from_secs(self.config.search_ttl_secs)),
        );
        Ok((page, false))
    }

    /// One podcast from the directory. Not cached.
    pub async fn podcast(&self, id: &str) -> Result<Podcast, DirectoryError> {
        self.directory.get_podcast(id).await
    }

    /// Features for one podcast, from cache or the analyzer.
    ///
    /// Returns `None` when the analyzer fails; the failure is logged.
    /// The flag tells whether the features came from cache.
    pub async fn analyze(&self, podcast: &Podcast) -> Option<(PodcastFeatures, bool)> {
        let key = analysis_fingerprint(
            &podcast.id,
            self.analyzer.kind(),
            &self.config.analysis_version,
        );

        if let Some(features) = self.cache.lookup_features(&key) {
            metrics::ANALYSES.with_label_values(&["cached"]).inc();
            return Some((features, true));
        }

        match self.analyzer.analyze(podcast).await {
            Ok(features) => {
                metrics::ANALYSES.with_label_values(&["computed"]).inc();
                self.cache.store(
                    &key,
                    CachedValue::Features(features.clone()),
                    Some(Duration::from_secs(self.config.analysis_ttl_secs)),
                );
                Some((features, false))
            }
            Err(e) => {
                warn!(
                    podcast_id = %podcast.id,
                    analyzer = self.analyzer.name(),
                    error = %e,
                    "Podcast analysis failed, skipping"
                );
                None
            }
        }
    }

    /// Find and rank podcasts for `author`.
    pub async fn find_matches(
        &self,
        author: &AuthorProfile,
        query: &SearchQuery,
    ) -> Result<MatchReport, PipelineError> {
        let (page, search_cached) = self.search(query).await?;

        let mut features = Vec::with_capacity(page.results.len());
        let mut analyses_cached = 0;
        let mut skipped = 0;
        for podcast in &page.results {
            match self.analyze(podcast).await {
                Some((f, cached)) => {
                    if cached {
                        analyses_cached += 1;
                    }
                    features.push(f);
                }
                None => skipped += 1,
            }
        }
        let analyses_computed = features.len() - analyses_cached;

        metrics::MATCHES_SCORED.inc_by(features.len() as u64);
        let mut matches = self.scorer.score_all(author, &features);
        matches.truncate(self.config.max_results);

        let results = self.processor.process_results(matches)?;

        info!(
            author_id = %author.id,
            query = %query.query,
            directory = self.directory.name(),
            found = page.results.len(),
            matched = results.total_matches,
            analyses_cached,
            skipped,
            "Match search complete"
        );

        Ok(MatchReport {
            query: query.clone(),
            total_available: page.total,
            next_offset: page.next_offset,
            search_cached,
            analyses_cached,
            analyses_computed,
            skipped,
            results,
        })
    }
}
