//! Results processing: the boundary between raw scoring and client output.
//!
//! A batch is validated as a whole before anything is aggregated. One bad
//! match rejects the batch.

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::matching::PodcastMatch;
use crate::metrics;

/// Why a match batch was rejected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("match #{index} has an empty podcast id")]
    EmptyPodcastId { index: usize },

    #[error("match #{index} ({podcast_id}) has negative overall score {score}")]
    NegativeScore {
        index: usize,
        podcast_id: String,
        score: f32,
    },

    #[error("match #{index} ({podcast_id}) has {factor} factor {value} outside [-1, 1]")]
    FactorOutOfRange {
        index: usize,
        podcast_id: String,
        factor: String,
        value: f32,
    },

    #[error("match #{index} ({podcast_id}) has confidence {value} outside [0, 1]")]
    ConfidenceOutOfRange {
        index: usize,
        podcast_id: String,
        value: f32,
    },

    #[error("match #{index} ({podcast_id}) has a non-finite {field}")]
    NonFinite {
        index: usize,
        podcast_id: String,
        field: String,
    },
}

/// Aggregated view of one processed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResults {
    /// Input matches, order preserved.
    pub top_matches: Vec<PodcastMatch>,
    pub total_matches: usize,
    /// Mean confidence, 0 for an empty batch.
    pub average_confidence: f32,
    pub processing_time_ms: f64,
    /// Distinct match reasons in order of first appearance.
    pub applied_filters: Vec<String>,
}

/// Validates and aggregates match batches.
#[derive(Debug, Clone, Default)]
pub struct ResultsProcessor;

impl ResultsProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Validate then aggregate `matches`.
    pub fn process_results(
        &self,
        matches: Vec<PodcastMatch>,
    ) -> Result<ProcessedResults, ValidationError> {
        let start = Instant::now();

        if let Err(e) = Self::validate(&matches) {
            warn!(error = %e, batch_size = matches.len(), "Rejected match batch");
            metrics::MATCH_BATCHES.with_label_values(&["rejected"]).inc();
            return Err(e);
        }

        let average_confidence = if matches.is_empty() {
            0.0
        } else {
            matches.iter().map(|m| m.confidence).sum::<f32>() / matches.len() as f32
        };

        let mut seen = HashSet::new();
        let applied_filters: Vec<String> = matches
            .iter()
            .flat_map(|m| m.match_reasons.iter())
            .filter(|reason| seen.insert(reason.as_str()))
            .cloned()
            .collect();

        for m in &matches {
            metrics::MATCH_CONFIDENCE
                .with_label_values(&[])
                .observe(m.confidence as f64);
        }
        metrics::MATCH_BATCHES.with_label_values(&["processed"]).inc();

        let total_matches = matches.len();
        let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        debug!(
            total_matches,
            average_confidence, processing_time_ms, "Processed match batch"
        );

        Ok(ProcessedResults {
            top_matches: matches,
            total_matches,
            average_confidence,
            processing_time_ms,
            applied_filters,
        })
    }

    /// Check every match; the first failure wins.
    pub fn validate(matches: &[PodcastMatch]) -> Result<(), ValidationError> {
        for (index, m) in matches.iter().enumerate() {
            if m.podcast_id.trim().is_empty() {
                return Err(ValidationError::EmptyPodcastId { index });
            }

            let non_finite = |field: &str| ValidationError::NonFinite {
                index,
                podcast_id: m.podcast_id.clone(),
                field: field.to_string(),
            };

            if !m.overall_score.is_finite() {
                return Err(non_finite("overall_score"));
            }
            if !m.confidence.is_finite() {
                return Err(non_finite("confidence"));
            }
            if m.overall_score < 0.0 {
                return Err(ValidationError::NegativeScore {
                    index,
                    podcast_id: m.podcast_id.clone(),
                    score: m.overall_score,
                });
            }

            if !(0.0..=1.0).contains(&m.confidence) {
                return Err(ValidationError::ConfidenceOutOfRange {
                    index,
                    podcast_id: m.podcast_id.clone(),
                    value: m.confidence,
                });
            }

            for (name, value) in m.factors.named() {
                if !(-1.0..=1.0).contains(&value) {
                    return Err(ValidationError::FactorOutOfRange {
                        index,
                        podcast_id: m.podcast_id.clone(),
                        factor: name.to_string(),
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}
