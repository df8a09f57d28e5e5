//! Scorer and pipeline configuration.

use serde::{Deserialize, Serialize};

/// Factor weights and cut-off for the compatibility scorer.
///
/// Weights need not sum to 1; the scorer normalizes by their total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    #[serde(default = "default_topic_weight")]
    pub topic_weight: f32,
    #[serde(default = "default_expertise_weight")]
    pub expertise_weight: f32,
    #[serde(default = "default_style_weight")]
    pub style_weight: f32,
    #[serde(default = "default_audience_weight")]
    pub audience_weight: f32,
    #[serde(default = "default_format_weight")]
    pub format_weight: f32,
    /// Matches below this overall score are dropped by `score_all`.
    #[serde(default)]
    pub min_score: f32,
}

impl ScorerConfig {
    /// Weights in factor order: topic, expertise, style, audience, format.
    pub fn weights(&self) -> [f32; 5] {
        [
            self.topic_weight,
            self.expertise_weight,
            self.style_weight,
            self.audience_weight,
            self.format_weight,
        ]
    }
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            topic_weight: default_topic_weight(),
            expertise_weight: default_expertise_weight(),
            style_weight: default_style_weight(),
            audience_weight: default_audience_weight(),
            format_weight: default_format_weight(),
            min_score: 0.0,
        }
    }
}

fn default_topic_weight() -> f32 {
    0.35
}

fn default_expertise_weight() -> f32 {
    0.15
}

fn default_style_weight() -> f32 {
    0.2
}

fn default_audience_weight() -> f32 {
    0.15
}

fn default_format_weight() -> f32 {
    0.15
}

/// Match pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Analysis version tag; changing it orphans every cached analysis.
    #[serde(default = "default_analysis_version")]
    pub analysis_version: String,
    #[serde(default = "default_analysis_ttl_secs")]
    pub analysis_ttl_secs: u64,
    #[serde(default = "default_search_ttl_secs")]
    pub search_ttl_secs: u64,
    /// Maximum matches returned per request.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            analysis_version: default_analysis_version(),
            analysis_ttl_secs: default_analysis_ttl_secs(),
            search_ttl_secs: default_search_ttl_secs(),
            max_results: default_max_results(),
        }
    }
}

fn default_analysis_version() -> String {
    "v1".to_string()
}

fn default_analysis_ttl_secs() -> u64 {
    43200
}

fn default_search_ttl_secs() -> u64 {
    3600
}

fn default_max_results() -> usize {
    20
}
