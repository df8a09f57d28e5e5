//! Author, podcast feature and match types.

use serde::{Deserialize, Serialize};

/// How deep an author's subject knowledge goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    Novice,
    Intermediate,
    Advanced,
    Expert,
}

impl ExpertiseLevel {
    /// Ordinal from 0 (novice) to 3 (expert).
    pub fn rank(&self) -> u8 {
        match self {
            ExpertiseLevel::Novice => 0,
            ExpertiseLevel::Intermediate => 1,
            ExpertiseLevel::Advanced => 2,
            ExpertiseLevel::Expert => 3,
        }
    }
}

/// How an author prefers to talk on air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Conversational,
    Storytelling,
    Analytical,
    Educational,
    Humorous,
    Inspirational,
}

/// Who a show or a book is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceLevel {
    General,
    Enthusiast,
    Professional,
}

impl AudienceLevel {
    pub fn rank(&self) -> u8 {
        match self {
            AudienceLevel::General => 0,
            AudienceLevel::Enthusiast => 1,
            AudienceLevel::Professional => 2,
        }
    }
}

/// How deep a show goes into its topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicDepth {
    Surface,
    Moderate,
    Deep,
}

impl TopicDepth {
    pub fn rank(&self) -> u8 {
        match self {
            TopicDepth::Surface => 0,
            TopicDepth::Moderate => 1,
            TopicDepth::Deep => 2,
        }
    }
}

/// How the host runs the show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStyle {
    Interview,
    Conversational,
    Narrative,
    Debate,
    Educational,
    Comedic,
}

/// Episode format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PodcastFormat {
    Interview,
    CoHosted,
    Panel,
    Solo,
    Narrative,
}

impl PodcastFormat {
    /// Whether the format has room for a guest.
    pub fn hosts_guests(&self) -> bool {
        matches!(
            self,
            PodcastFormat::Interview | PodcastFormat::CoHosted | PodcastFormat::Panel
        )
    }
}

/// The book an author is promoting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<AudienceLevel>,
}

/// An author looking for podcast appearances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise_level: Option<ExpertiseLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_style: Option<CommunicationStyle>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<BookMetadata>,
    #[serde(default)]
    pub preferred_formats: Vec<PodcastFormat>,
}

/// Analyzed feature set of one podcast. Every field may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodcastFeatures {
    pub podcast_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_style: Option<HostStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience_level: Option<AudienceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_depth: Option<TopicDepth>,
    #[serde(default)]
    pub topical_focus: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<PodcastFormat>,
}

/// Named sub-scores of a match, each in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchFactors {
    pub topic: f32,
    pub expertise: f32,
    pub style: f32,
    pub audience: f32,
    pub format: f32,
}

impl MatchFactors {
    /// Factors paired with their names.
    pub fn named(&self) -> [(&'static str, f32); 5] {
        [
            ("topic", self.topic),
            ("expertise", self.expertise),
            ("style", self.style),
            ("audience", self.audience),
            ("format", self.format),
        ]
    }
}

/// A scored author/podcast pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastMatch {
    pub podcast_id: String,
    #[serde(default)]
    pub title: String,
    pub overall_score: f32,
    /// Share of the scoring signal that was actually available (0.0-1.0).
    pub confidence: f32,
    pub factors: MatchFactors,
    /// Reason tags, in the order they were produced.
    #[serde(default)]
    pub match_reasons: Vec<String>,
}
