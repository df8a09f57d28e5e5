//! Heuristic author/podcast compatibility scorer.
//!
//! Five sub-scores, each in [-1, 1]:
//! - topic: author topics (plus book genres and keywords) vs topical focus
//! - expertise: author expertise vs the depth the show goes into
//! - style: communication style vs host style
//! - audience: the book's target audience vs the show's audience
//! - format: episode format vs the author's preferred formats
//!
//! A factor with no signal on either side scores [`NEUTRAL`] and does not
//! count towards confidence. Negative values mark explicit mismatches.

use std::collections::HashSet;

use super::config::ScorerConfig;
use super::types::{
    AuthorProfile, CommunicationStyle, ExpertiseLevel, HostStyle, MatchFactors, PodcastFeatures,
    PodcastFormat, PodcastMatch, TopicDepth,
};

/// Score of a factor that had nothing to compare.
pub const NEUTRAL: f32 = 0.5;

/// Sub-score at or above which a factor yields a match reason.
const REASON_THRESHOLD: f32 = 0.6;

/// One computed factor.
#[derive(Debug, Clone, Copy)]
struct Factor {
    score: f32,
    /// Whether both sides carried signal.
    informed: bool,
}

impl Factor {
    fn neutral() -> Self {
        Self {
            score: NEUTRAL,
            informed: false,
        }
    }

    fn informed(score: f32) -> Self {
        Self {
            score: score.clamp(-1.0, 1.0),
            informed: true,
        }
    }
}

/// Compatibility scorer. Pure: no I/O, no shared state.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityScorer {
    config: ScorerConfig,
}

impl CompatibilityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score one podcast for one author.
    pub fn score(&self, author: &AuthorProfile, features: &PodcastFeatures) -> PodcastMatch {
        let topic = Self::topic_fit(author, features);
        let expertise = Self::expertise_fit(author, features);
        let style = Self::style_fit(author, features);
        let audience = Self::audience_fit(author, features);
        let format = Self::format_fit(author, features);

        let factors = [topic, expertise, style, audience, format];
        let weights = self.config.weights();
        let total_weight: f32 = weights.iter().sum();

        let (overall_score, confidence) = if total_weight > 0.0 {
            let weighted: f32 = factors
                .iter()
                .zip(weights.iter())
                .map(|(f, w)| f.score * w)
                .sum();
            let informed: f32 = factors
                .iter()
                .zip(weights.iter())
                .filter(|(f, _)| f.informed)
                .map(|(_, w)| w)
                .sum();
            (
                (weighted / total_weight).clamp(0.0, 1.0),
                (informed / total_weight).clamp(0.0, 1.0),
            )
        } else {
            (NEUTRAL, 0.0)
        };

        let reasons = [
            ("topic-match", topic),
            ("expertise-fit", expertise),
            ("style-fit", style),
            ("audience-fit", audience),
            ("format-fit", format),
        ];
        let match_reasons = reasons
            .iter()
            .filter(|(_, f)| f.informed && f.score >= REASON_THRESHOLD)
            .map(|(reason, _)| reason.to_string())
            .collect();

        PodcastMatch {
            podcast_id: features.podcast_id.clone(),
            title: features.title.clone(),
            overall_score,
            confidence,
            factors: MatchFactors {
                topic: topic.score,
                expertise: expertise.score,
                style: style.score,
                audience: audience.score,
                format: format.score,
            },
            match_reasons,
        }
    }

    /// Score every podcast, drop those under `min_score`, best first.
    ///
    /// Ties keep input order.
    pub fn score_all(
        &self,
        author: &AuthorProfile,
        podcasts: &[PodcastFeatures],
    ) -> Vec<PodcastMatch> {
        let mut matches: Vec<PodcastMatch> = podcasts
            .iter()
            .map(|p| self.score(author, p))
            .filter(|m| m.overall_score >= self.config.min_score)
            .collect();

        matches.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
        matches
    }

    /// Topic overlap.
    ///
    /// Each author topic phrase counts 1 when one of its keywords is in the
    /// show's focus, 0.5 on a partial (substring) keyword hit. The ratio of
    /// matched phrases is the score. No topics on either side is neutral, so
    /// an author without topics is never penalized by a broad show. Zero
    /// overlap against a show with a known focus is a mild mismatch.
    fn topic_fit(author: &AuthorProfile, features: &PodcastFeatures) -> Factor {
        let mut phrases: Vec<&str> = author.topics.iter().map(String::as_str).collect();
        if let Some(book) = &author.book {
            phrases.extend(book.genres.iter().map(String::as_str));
            phrases.extend(book.keywords.iter().map(String::as_str));
        }

        let author_phrases: Vec<HashSet<String>> = phrases
            .into_iter()
            .map(extract_keywords)
            .filter(|k| !k.is_empty())
            .collect();

        let focus: HashSet<String> = features
            .topical_focus
            .iter()
            .flat_map(|t| extract_keywords(t))
            .collect();

        if author_phrases.is_empty() || focus.is_empty() {
            return Factor::neutral();
        }

        let matched: f32 = author_phrases
            .iter()
            .map(|phrase| {
                if phrase.iter().any(|kw| focus.contains(kw)) {
                    1.0
                } else if phrase
                    .iter()
                    .any(|kw| focus.iter().any(|f| is_partial_match(kw, f)))
                {
                    0.5
                } else {
                    0.0
                }
            })
            .sum();

        if matched == 0.0 {
            return Factor::informed(-0.25);
        }
        Factor::informed((matched / author_phrases.len() as f32).min(1.0))
    }

    /// Expertise vs topic depth.
    ///
    /// Novices suit surface shows, intermediates moderate ones, advanced
    /// authors and experts deep ones. An author less expert than the show
    /// expects is an explicit mismatch; an expert on a surface show is only
    /// a weak fit, since experts can still talk to a general audience.
    fn expertise_fit(author: &AuthorProfile, features: &PodcastFeatures) -> Factor {
        let (Some(level), Some(depth)) = (author.expertise_level, features.topic_depth) else {
            return Factor::neutral();
        };

        let expected = match level {
            ExpertiseLevel::Novice => TopicDepth::Surface,
            ExpertiseLevel::Intermediate => TopicDepth::Moderate,
            ExpertiseLevel::Advanced | ExpertiseLevel::Expert => TopicDepth::Deep,
        };

        let gap = expected.rank() as i8 - depth.rank() as i8;
        let score = match gap {
            0 => 1.0,
            // Author deeper than the show.
            1 => 0.5,
            g if g >= 2 => 0.0,
            // Show deeper than the author.
            -1 => 0.1,
            _ => -0.6,
        };
        Factor::informed(score)
    }

    /// Communication style vs host style, from a fixed affinity table.
    fn style_fit(author: &AuthorProfile, features: &PodcastFeatures) -> Factor {
        let (Some(style), Some(host)) = (author.communication_style, features.host_style) else {
            return Factor::neutral();
        };

        use CommunicationStyle as C;
        use HostStyle as H;
        let score = match (style, host) {
            (C::Conversational, H::Conversational) => 1.0,
            (C::Conversational, H::Interview) => 0.8,
            (C::Conversational, H::Comedic) => 0.5,
            (C::Conversational, H::Educational) => 0.4,
            (C::Conversational, H::Narrative) => 0.2,
            (C::Conversational, H::Debate) => 0.0,

            (C::Storytelling, H::Narrative) => 1.0,
            (C::Storytelling, H::Interview) => 0.7,
            (C::Storytelling, H::Conversational) => 0.7,
            (C::Storytelling, H::Educational) => 0.3,
            (C::Storytelling, H::Comedic) => 0.3,
            (C::Storytelling, H::Debate) => -0.3,

            (C::Analytical, H::Debate) => 0.9,
            (C::Analytical, H::Educational) => 0.8,
            (C::Analytical, H::Interview) => 0.7,
            (C::Analytical, H::Conversational) => 0.4,
            (C::Analytical, H::Narrative) => 0.2,
            (C::Analytical, H::Comedic) => -0.5,

            (C::Educational, H::Educational) => 1.0,
            (C::Educational, H::Interview) => 0.7,
            (C::Educational, H::Conversational) => 0.5,
            (C::Educational, H::Narrative) => 0.4,
            (C::Educational, H::Debate) => 0.2,
            (C::Educational, H::Comedic) => -0.2,

            (C::Humorous, H::Comedic) => 1.0,
            (C::Humorous, H::Conversational) => 0.8,
            (C::Humorous, H::Interview) => 0.5,
            (C::Humorous, H::Debate) => 0.2,
            (C::Humorous, H::Narrative) => 0.1,
            (C::Humorous, H::Educational) => -0.2,

            (C::Inspirational, H::Narrative) => 0.8,
            (C::Inspirational, H::Interview) => 0.8,
            (C::Inspirational, H::Conversational) => 0.7,
            (C::Inspirational, H::Educational) => 0.4,
            (C::Inspirational, H::Comedic) => 0.1,
            (C::Inspirational, H::Debate) => -0.4,
        };
        Factor::informed(score)
    }

    /// The book's target audience vs the show's audience.
    ///
    /// Only the book declares an audience; an author without a book or a
    /// book without a target is neutral. Two levels apart is a mismatch.
    fn audience_fit(author: &AuthorProfile, features: &PodcastFeatures) -> Factor {
        let target = author.book.as_ref().and_then(|b| b.target_audience);
        let (Some(target), Some(audience)) = (target, features.audience_level) else {
            return Factor::neutral();
        };

        let score = match target.rank().abs_diff(audience.rank()) {
            0 => 1.0,
            1 => 0.4,
            _ => -0.5,
        };
        Factor::informed(score)
    }

    /// Episode format vs preferred formats.
    ///
    /// Unknown format is neutral. A preferred format scores 1. Without
    /// preferences any guest-friendly format is a good fit. Solo shows have
    /// no guest slot and are a mismatch either way.
    fn format_fit(author: &AuthorProfile, features: &PodcastFeatures) -> Factor {
        let Some(format) = features.format else {
            return Factor::neutral();
        };

        if format == PodcastFormat::Solo && !author.preferred_formats.contains(&format) {
            return Factor::informed(-0.5);
        }

        let score = if author.preferred_formats.contains(&format) {
            1.0
        } else if author.preferred_formats.is_empty() {
            if format.hosts_guests() {
                0.7
            } else {
                0.2
            }
        } else if format.hosts_guests() {
            0.3
        } else {
            0.0
        };
        Factor::informed(score)
    }
}

/// Substring match between keywords of at least 4 chars ("startup"/"startups").
fn is_partial_match(a: &str, b: &str) -> bool {
    a.len() > 3 && b.len() > 3 && (a.contains(b) || b.contains(a))
}

/// Extract keywords from text for matching.
pub(crate) fn extract_keywords(text: &str) -> HashSet<String> {
    let stop_words: HashSet<&str> = [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "about",
        "your", "you", "our", "we", "how", "what", "this", "that", "it", "its",
    ]
    .into_iter()
    .collect();

    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .map(|s| s.trim().to_string())
        .filter(|s| s.len() > 1)
        .filter(|s| !stop_words.contains(s.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::types::{AudienceLevel, BookMetadata};

    fn author() -> AuthorProfile {
        AuthorProfile {
            id: "author-1".to_string(),
            name: "Ada".to_string(),
            expertise_level: Some(ExpertiseLevel::Expert),
            communication_style: Some(CommunicationStyle::Analytical),
            topics: vec!["machine learning".to_string(), "startups".to_string()],
            book: Some(BookMetadata {
                title: "Shipping Models".to_string(),
                genres: vec!["technology".to_string()],
                keywords: vec![],
                target_audience: Some(AudienceLevel::Professional),
            }),
            preferred_formats: vec![PodcastFormat::Interview],
        }
    }

    fn podcast() -> PodcastFeatures {
        PodcastFeatures {
            podcast_id: "pod-1".to_string(),
            title: "Deep Learning Weekly".to_string(),
            host_style: Some(HostStyle::Interview),
            audience_level: Some(AudienceLevel::Professional),
            topic_depth: Some(TopicDepth::Deep),
            topical_focus: vec![
                "machine learning".to_string(),
                "startups".to_string(),
                "technology".to_string(),
            ],
            format: Some(PodcastFormat::Interview),
        }
    }

    fn in_range(factors: &MatchFactors) -> bool {
        factors
            .named()
            .iter()
            .all(|(_, v)| (-1.0..=1.0).contains(v))
    }

    #[test]
    fn test_strong_match() {
        let m = CompatibilityScorer::new().score(&author(), &podcast());

        assert_eq!(m.podcast_id, "pod-1");
        assert!(m.overall_score > 0.8, "score {}", m.overall_score);
        assert!((m.confidence - 1.0).abs() < 1e-6);
        assert_eq!(m.factors.topic, 1.0);
        assert_eq!(m.factors.expertise, 1.0);
        assert!(m.match_reasons.contains(&"topic-match".to_string()));
        assert!(m.match_reasons.contains(&"format-fit".to_string()));
        assert!(in_range(&m.factors));
    }

    #[test]
    fn test_author_without_topics_gets_neutral_topic_score() {
        let mut author = author();
        author.topics.clear();
        author.book = None;

        let mut broad = podcast();
        broad.topical_focus = vec![
            "business".into(),
            "culture".into(),
            "science".into(),
            "history".into(),
            "health".into(),
            "sports".into(),
        ];

        let m = CompatibilityScorer::new().score(&author, &broad);
        assert_eq!(m.factors.topic, NEUTRAL);
        assert!(!m.match_reasons.contains(&"topic-match".to_string()));
        assert!(m.overall_score > 0.0);
    }

    #[test]
    fn test_sparse_features_lower_confidence_but_still_score() {
        let sparse = PodcastFeatures {
            podcast_id: "pod-2".to_string(),
            ..Default::default()
        };

        let m = CompatibilityScorer::new().score(&author(), &sparse);
        assert_eq!(m.confidence, 0.0);
        assert!((m.overall_score - NEUTRAL).abs() < 1e-6);
        assert!(m.match_reasons.is_empty());

        let mut partial = podcast();
        partial.host_style = None;
        partial.format = None;
        let m = CompatibilityScorer::new().score(&author(), &partial);
        assert!((m.confidence - 0.65).abs() < 1e-5, "confidence {}", m.confidence);
    }

    #[test]
    fn test_explicit_mismatches_are_negative() {
        let mut author = author();
        author.expertise_level = Some(ExpertiseLevel::Novice);
        author.communication_style = Some(CommunicationStyle::Analytical);
        if let Some(book) = author.book.as_mut() {
            book.target_audience = Some(AudienceLevel::General);
        }

        let mut show = podcast();
        show.host_style = Some(HostStyle::Comedic);
        show.format = Some(PodcastFormat::Solo);

        let m = CompatibilityScorer::new().score(&author, &show);
        assert!(m.factors.expertise < 0.0);
        assert!(m.factors.style < 0.0);
        assert!(m.factors.audience < 0.0);
        assert!(m.factors.format < 0.0);
        assert!(m.overall_score >= 0.0);
        assert!(in_range(&m.factors));
    }

    #[test]
    fn test_no_topic_overlap_is_mild_mismatch() {
        let mut show = podcast();
        show.topical_focus = vec!["gardening".into(), "cooking".into()];
        let m = CompatibilityScorer::new().score(&author(), &show);
        assert_eq!(m.factors.topic, -0.25);
    }

    #[test]
    fn test_partial_topic_overlap() {
        let mut author = author();
        author.book = None;
        author.topics = vec!["startups".into(), "gardening".into()];
        let m = CompatibilityScorer::new().score(&author, &podcast());
        assert!((m.factors.topic - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_score_all_filters_and_sorts() {
        let scorer = CompatibilityScorer::with_config(ScorerConfig {
            min_score: 0.4,
            ..Default::default()
        });

        let weak = PodcastFeatures {
            podcast_id: "weak".to_string(),
            topical_focus: vec!["gardening".into()],
            format: Some(PodcastFormat::Solo),
            ..Default::default()
        };
        let mid = PodcastFeatures {
            podcast_id: "mid".to_string(),
            topical_focus: vec!["startups".into()],
            ..Default::default()
        };

        let matches = scorer.score_all(&author(), &[weak, mid, podcast()]);
        let ids: Vec<_> = matches.iter().map(|m| m.podcast_id.as_str()).collect();
        assert_eq!(ids, vec!["pod-1", "mid"]);
        assert!(matches[0].overall_score >= matches[1].overall_score);
    }

    #[test]
    fn test_zero_weights_do_not_divide_by_zero() {
        let scorer = CompatibilityScorer::with_config(ScorerConfig {
            topic_weight: 0.0,
            expertise_weight: 0.0,
            style_weight: 0.0,
            audience_weight: 0.0,
            format_weight: 0.0,
            min_score: 0.0,
        });
        let m = scorer.score(&author(), &podcast());
        assert_eq!(m.overall_score, NEUTRAL);
        assert_eq!(m.confidence, 0.0);
    }

    #[test]
    fn test_every_style_pair_in_range() {
        let styles = [
            CommunicationStyle::Conversational,
            CommunicationStyle::Storytelling,
            CommunicationStyle::Analytical,
            CommunicationStyle::Educational,
            CommunicationStyle::Humorous,
            CommunicationStyle::Inspirational,
        ];
        let hosts = [
            HostStyle::Interview,
            HostStyle::Conversational,
            HostStyle::Narrative,
            HostStyle::Debate,
            HostStyle::Educational,
            HostStyle::Comedic,
        ];
        let scorer = CompatibilityScorer::new();
        for style in styles {
            for host in hosts {
                let mut a = author();
                a.communication_style = Some(style);
                let mut p = podcast();
                p.host_style = Some(host);
                let m = scorer.score(&a, &p);
                assert!(in_range(&m.factors));
                assert!((0.0..=1.0).contains(&m.overall_score));
            }
        }
    }

    #[test]
    fn test_extract_keywords() {
        let keywords = extract_keywords("The Art of Machine-Learning in 2024");
        assert!(keywords.contains("art"));
        assert!(keywords.contains("machine"));
        assert!(keywords.contains("learning"));
        assert!(keywords.contains("2024"));
        assert!(!keywords.contains("the"));
        assert!(!keywords.contains("of"));
    }
}
