//! Mock podcast analyzer for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::analysis::{AnalysisError, PodcastAnalyzer};
use crate::directory::Podcast;
use crate::matching::PodcastFeatures;

/// Mock implementation of the [`PodcastAnalyzer`] trait.
///
/// Returns configured features per podcast ID, or bare features carrying
/// only the ID and title. Counts calls so tests can tell cache hits apart.
#[derive(Debug, Clone, Default)]
pub struct MockAnalyzer {
    features: Arc<RwLock<HashMap<String, PodcastFeatures>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Features to return for `features.podcast_id`.
    pub async fn set_features(&self, features: PodcastFeatures) {
        self.features
            .write()
            .await
            .insert(features.podcast_id.clone(), features);
    }

    /// Make analysis of this podcast fail.
    pub async fn fail_for(&self, podcast_id: &str) {
        self.failing.write().await.insert(podcast_id.to_string());
    }

    /// Podcast IDs analyzed, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl PodcastAnalyzer for MockAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, podcast: &Podcast) -> Result<PodcastFeatures, AnalysisError> {
        self.calls.write().await.push(podcast.id.clone());

        if self.failing.read().await.contains(&podcast.id) {
            return Err(AnalysisError::Failed(format!(
                "mock failure for {}",
                podcast.id
            )));
        }

        Ok(self
            .features
            .read()
            .await
            .get(&podcast.id)
            .cloned()
            .unwrap_or_else(|| PodcastFeatures {
                podcast_id: podcast.id.clone(),
                title: podcast.title.clone(),
                ..Default::default()
            }))
    }
}
