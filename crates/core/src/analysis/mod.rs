//! Podcast analysis: derive a [`PodcastFeatures`] set from directory metadata.

mod keyword;

pub use keyword::KeywordAnalyzer;

use async_trait::async_trait;
use thiserror::Error;

use crate::directory::Podcast;
use crate::matching::PodcastFeatures;

/// Errors that can occur during podcast analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis failed: {0}")]
    Failed(String),

    #[error("Not enough metadata to analyze podcast {0}")]
    InsufficientData(String),
}

/// Derives podcast features.
///
/// Implementations can use heuristics or a language model.
#[async_trait]
pub trait PodcastAnalyzer: Send + Sync {
    /// Name of this analyzer for logging.
    fn name(&self) -> &str;

    /// Analysis kind, part of the cache key.
    fn kind(&self) -> &str {
        "features"
    }

    /// Analyze one podcast. Fields the analyzer cannot determine stay unset.
    async fn analyze(&self, podcast: &Podcast) -> Result<PodcastFeatures, AnalysisError>;
}
