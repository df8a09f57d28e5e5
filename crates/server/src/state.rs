use std::sync::Arc;

use podmatch_core::{
    AnalysisCache, CompatibilityScorer, Config, MatchPipeline, MatchStore, PodcastAnalyzer,
    PodcastDirectory, SanitizedConfig, SlidingWindowLimiter,
};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: MatchPipeline,
    cache: Arc<AnalysisCache>,
    match_store: Arc<dyn MatchStore>,
    /// Limiter in front of the directory, when the directory is rate limited.
    limiter: Option<Arc<SlidingWindowLimiter>>,
}

impl AppState {
    /// Build the state and the match pipeline it serves.
    pub fn new(
        config: Config,
        directory: Arc<dyn PodcastDirectory>,
        analyzer: Arc<dyn PodcastAnalyzer>,
        cache: Arc<AnalysisCache>,
        match_store: Arc<dyn MatchStore>,
        limiter: Option<Arc<SlidingWindowLimiter>>,
    ) -> Self {
        let pipeline = MatchPipeline::new(
            directory,
            analyzer,
            Arc::clone(&cache),
            CompatibilityScorer::with_config(config.scorer.clone()),
            config.pipeline.clone(),
        );

        Self {
            config,
            pipeline,
            cache,
            match_store,
            limiter,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> &MatchPipeline {
        &self.pipeline
    }

    pub fn cache(&self) -> &AnalysisCache {
        self.cache.as_ref()
    }

    pub fn match_store(&self) -> &dyn MatchStore {
        self.match_store.as_ref()
    }

    pub fn limiter(&self) -> Option<&SlidingWindowLimiter> {
        self.limiter.as_deref()
    }
}
