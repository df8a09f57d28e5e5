//! Keyword (heuristic-based) podcast analyzer.
//!
//! Looks for cue phrases in the title, publisher and description. No LLM
//! required - works entirely offline.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{AnalysisError, PodcastAnalyzer};
use crate::directory::Podcast;
use crate::matching::scorer::extract_keywords;
use crate::matching::{AudienceLevel, HostStyle, PodcastFeatures, PodcastFormat, TopicDepth};

const FORMAT_CUES: &[(PodcastFormat, &[&str])] = &[
    (
        PodcastFormat::Interview,
        &["interview", "guest", "conversations with", "talks with", "sits down with"],
    ),
    (PodcastFormat::CoHosted, &["co-host", "cohost", "co-hosted", "your hosts"]),
    (PodcastFormat::Panel, &["panel", "roundtable", "round table"]),
    (PodcastFormat::Solo, &["solo", "monologue", "my thoughts", "i share"]),
    (
        PodcastFormat::Narrative,
        &["documentary", "narrative", "true story", "told in episodes", "series about"],
    ),
];

const HOST_STYLE_CUES: &[(HostStyle, &[&str])] = &[
    (HostStyle::Interview, &["interview", "guest", "we ask"]),
    (
        HostStyle::Conversational,
        &["chat", "conversation", "casual", "hang out", "banter"],
    ),
    (HostStyle::Narrative, &["story", "stories", "documentary", "narrative"]),
    (HostStyle::Debate, &["debate", "argue", "versus", "both sides"]),
    (
        HostStyle::Educational,
        &["learn", "explained", "lesson", "guide", "how to", "teach"],
    ),
    (HostStyle::Comedic, &["comedy", "funny", "laugh", "humor", "hilarious"]),
];

const AUDIENCE_CUES: &[(AudienceLevel, &[&str])] = &[
    (
        AudienceLevel::Professional,
        &["professional", "executive", "practitioner", "industry", "leaders", "b2b"],
    ),
    (
        AudienceLevel::Enthusiast,
        &["enthusiast", "fans", "nerd", "hobbyist", "geek", "lovers"],
    ),
    (
        AudienceLevel::General,
        &["everyone", "beginner", "everyday", "curious minds", "anyone"],
    ),
];

const DEPTH_CUES: &[(TopicDepth, &[&str])] = &[
    (
        TopicDepth::Deep,
        &["deep dive", "in-depth", "in depth", "technical", "research", "rigorous"],
    ),
    (TopicDepth::Moderate, &["insight", "explore", "discussion", "breakdown"]),
    (
        TopicDepth::Surface,
        &["news", "quick", "daily", "minutes", "bite-sized", "headlines"],
    ),
];

/// Listen Notes top-level genre names.
const GENRES: &[(u32, &str)] = &[
    (67, "comedy"),
    (68, "tv & film"),
    (69, "religion & spirituality"),
    (77, "sports"),
    (82, "leisure"),
    (88, "health & fitness"),
    (93, "business"),
    (99, "news"),
    (100, "arts"),
    (107, "science"),
    (111, "education"),
    (117, "government"),
    (122, "society & culture"),
    (125, "history"),
    (127, "technology"),
    (132, "kids & family"),
    (134, "music"),
    (135, "true crime"),
    (144, "personal finance"),
    (168, "fiction"),
];

/// Configuration for the keyword analyzer.
#[derive(Debug, Clone)]
pub struct KeywordAnalyzerConfig {
    /// Maximum description keywords added to the topical focus.
    pub max_focus_keywords: usize,
    /// Minimum keyword length to count as a topic.
    pub min_keyword_len: usize,
}

impl Default for KeywordAnalyzerConfig {
    fn default() -> Self {
        Self {
            max_focus_keywords: 8,
            min_keyword_len: 4,
        }
    }
}

/// Heuristic podcast analyzer.
#[derive(Debug, Clone, Default)]
pub struct KeywordAnalyzer {
    config: KeywordAnalyzerConfig,
}

impl KeywordAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KeywordAnalyzerConfig) -> Self {
        Self { config }
    }

    /// The option with the most cue hits; ties go to the earlier entry.
    fn strongest<T: Copy>(text: &str, table: &[(T, &[&str])]) -> Option<T> {
        let mut best: Option<(T, usize)> = None;
        for (value, cues) in table {
            let hits = cues.iter().filter(|cue| text.contains(*cue)).count();
            if hits > 0 && best.map_or(true, |(_, h)| hits > h) {
                best = Some((*value, hits));
            }
        }
        best.map(|(value, _)| value)
    }

    /// Genre names first, then the most frequent description keywords.
    fn topical_focus(&self, podcast: &Podcast) -> Vec<String> {
        let mut focus: Vec<String> = podcast
            .genre_ids
            .iter()
            .filter_map(|id| GENRES.iter().find(|(g, _)| g == id))
            .map(|(_, name)| name.to_string())
            .collect();

        let mut counts: HashMap<String, usize> = HashMap::new();
        let text = format!("{} {}", podcast.title, podcast.description);
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() >= self.config.min_keyword_len)
        {
            if extract_keywords(word).contains(word) {
                *counts.entry(word.to_string()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        for (word, _) in ranked.into_iter().take(self.config.max_focus_keywords) {
            if !focus.contains(&word) {
                focus.push(word);
            }
        }
        focus
    }
}

#[async_trait]
impl PodcastAnalyzer for KeywordAnalyzer {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn analyze(&self, podcast: &Podcast) -> Result<PodcastFeatures, AnalysisError> {
        if podcast.id.trim().is_empty() {
            return Err(AnalysisError::InsufficientData(
                "(podcast without id)".to_string(),
            ));
        }

        let text = format!(
            "{} {} {}",
            podcast.title, podcast.publisher, podcast.description
        )
        .to_lowercase();

        Ok(PodcastFeatures {
            podcast_id: podcast.id.clone(),
            title: podcast.title.clone(),
            host_style: Self::strongest(&text, HOST_STYLE_CUES),
            audience_level: Self::strongest(&text, AUDIENCE_CUES),
            topic_depth: Self::strongest(&text, DEPTH_CUES),
            topical_focus: self.topical_focus(podcast),
            format: Self::strongest(&text, FORMAT_CUES),
        })
    }
}
