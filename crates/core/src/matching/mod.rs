//! Author/podcast compatibility matching.

mod config;
mod pipeline;
pub mod scorer;
mod types;

pub use config::{PipelineConfig, ScorerConfig};
pub use pipeline::{MatchPipeline, MatchReport, PipelineError};
pub use scorer::CompatibilityScorer;
pub use types::*;
