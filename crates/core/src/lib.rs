pub mod analysis;
pub mod cache;
pub mod config;
pub mod directory;
pub mod matching;
pub mod metrics;
pub mod results;
pub mod saved;
pub mod testing;

pub use analysis::{AnalysisError, KeywordAnalyzer, PodcastAnalyzer};
pub use cache::{AnalysisCache, CacheConfig, CacheError, CacheErrorKind, CacheStats};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use directory::{
    DirectoryError, ListenNotesClient, Podcast, PodcastDirectory, RateLimitError,
    SearchQuery, SearchResponse, SlidingWindowLimiter,
};
pub use matching::{
    AuthorProfile, CompatibilityScorer, MatchPipeline, MatchReport, PipelineError,
    PodcastFeatures, PodcastMatch,
};
pub use results::{ProcessedResults, ResultsProcessor, ValidationError};
pub use saved::{MatchStatus, MatchStore, MatchStoreError, SavedMatch, SqliteMatchStore};
