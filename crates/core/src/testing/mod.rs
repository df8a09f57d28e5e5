//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the podcast directory and the analyzer so the match
//! pipeline and the HTTP API can be exercised without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use podmatch_core::testing::{fixtures, MockAnalyzer, MockDirectory};
//!
//! let directory = MockDirectory::new();
//! directory.set_podcasts(vec![fixtures::podcast("pod-1", "Founders Talk")]).await;
//!
//! let analyzer = MockAnalyzer::new();
//! analyzer.set_features(fixtures::features("pod-1", "Founders Talk")).await;
//! ```

mod mock_analyzer;
mod mock_directory;

pub use mock_analyzer::MockAnalyzer;
pub use mock_directory::{MockDirectory, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::directory::Podcast;
    use crate::matching::{
        AudienceLevel, AuthorProfile, BookMetadata, CommunicationStyle, ExpertiseLevel,
        HostStyle, MatchFactors, PodcastFeatures, PodcastFormat, PodcastMatch, TopicDepth,
    };

    /// Create a directory podcast with reasonable defaults.
    pub fn podcast(id: &str, title: &str) -> Podcast {
        Podcast {
            id: id.to_string(),
            title: title.to_string(),
            publisher: "Mock Media".to_string(),
            description: format!("{} is a weekly interview show.", title),
            genre_ids: vec![93],
            total_episodes: Some(120),
            language: Some("English".to_string()),
            website: None,
            explicit_content: false,
        }
    }

    /// An expert business author who likes interviews.
    pub fn author(id: &str) -> AuthorProfile {
        AuthorProfile {
            id: id.to_string(),
            name: "Dana Writer".to_string(),
            expertise_level: Some(ExpertiseLevel::Expert),
            communication_style: Some(CommunicationStyle::Conversational),
            topics: vec!["startups".to_string(), "leadership".to_string()],
            book: Some(BookMetadata {
                title: "Scaling Calmly".to_string(),
                genres: vec!["business".to_string()],
                keywords: vec!["founders".to_string(), "management".to_string()],
                target_audience: Some(AudienceLevel::Enthusiast),
            }),
            preferred_formats: vec![PodcastFormat::Interview],
        }
    }

    /// Features that fit [`author`] well.
    pub fn features(podcast_id: &str, title: &str) -> PodcastFeatures {
        PodcastFeatures {
            podcast_id: podcast_id.to_string(),
            title: title.to_string(),
            host_style: Some(HostStyle::Conversational),
            audience_level: Some(AudienceLevel::Enthusiast),
            topic_depth: Some(TopicDepth::Deep),
            topical_focus: vec!["startups".to_string(), "leadership".to_string()],
            format: Some(PodcastFormat::Interview),
        }
    }

    /// A scored match with the given overall score.
    pub fn podcast_match(podcast_id: &str, score: f32) -> PodcastMatch {
        PodcastMatch {
            podcast_id: podcast_id.to_string(),
            title: format!("Podcast {}", podcast_id),
            overall_score: score,
            confidence: 1.0,
            factors: MatchFactors {
                topic: score,
                expertise: score,
                style: score,
                audience: score,
                format: score,
            },
            match_reasons: Vec::new(),
        }
    }
}
