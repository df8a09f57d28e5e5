//! Saved match types and the status lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::MatchFactors;

/// Why a match was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NotAFit,
    TopicMismatch,
    AudienceMismatch,
    NoResponse,
    Declined,
    SchedulingConflict,
    Other,
}

/// Lifecycle of a saved match.
///
/// ```text
/// viewed -> contacted -> pending -> scheduled -> completed
///    \__________\____________\__________\______-> rejected
/// ```
///
/// Moves go forward only (steps may be skipped). `rejected` is reachable
/// from any non-terminal status. `completed` and `rejected` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchStatus {
    /// The user looked at the match.
    Viewed,
    /// The user reached out to the show.
    Contacted,
    /// Waiting on the show.
    Pending,
    /// Recording booked.
    Scheduled {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scheduled_for: Option<DateTime<Utc>>,
    },
    /// Episode recorded or published.
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        episode_url: Option<String>,
    },
    Rejected {
        reason: RejectionReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl MatchStatus {
    /// Status name, as stored and filtered on.
    pub fn status_type(&self) -> &'static str {
        match self {
            MatchStatus::Viewed => "viewed",
            MatchStatus::Contacted => "contacted",
            MatchStatus::Pending => "pending",
            MatchStatus::Scheduled { .. } => "scheduled",
            MatchStatus::Completed { .. } => "completed",
            MatchStatus::Rejected { .. } => "rejected",
        }
    }

    /// Position along the forward path; `None` for `rejected`.
    fn stage(&self) -> Option<u8> {
        match self {
            MatchStatus::Viewed => Some(0),
            MatchStatus::Contacted => Some(1),
            MatchStatus::Pending => Some(2),
            MatchStatus::Scheduled { .. } => Some(3),
            MatchStatus::Completed { .. } => Some(4),
            MatchStatus::Rejected { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MatchStatus::Completed { .. } | MatchStatus::Rejected { .. }
        )
    }

    /// Whether `next` is a legal move from this status.
    ///
    /// Rescheduling (`scheduled -> scheduled`) is allowed.
    pub fn can_transition_to(&self, next: &MatchStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(3), Some(3)) => true,
            (Some(from), Some(to)) => to > from,
            (None, _) => false,
        }
    }
}

/// A match the user acted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMatch {
    pub id: String,
    pub user_id: String,
    pub podcast_id: String,
    pub podcast_title: String,
    /// Score snapshot from the latest recording.
    pub overall_score: f32,
    pub confidence: f32,
    pub factors: MatchFactors,
    pub match_reasons: Vec<String>,
    pub status: MatchStatus,
    pub bookmarked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
}

/// A free-text note on a saved match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub match_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// How the show was contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactChannel {
    Email,
    Social,
    Form,
    Other,
}

impl ContactChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactChannel::Email => "email",
            ContactChannel::Social => "social",
            ContactChannel::Form => "form",
            ContactChannel::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(ContactChannel::Email),
            "social" => Some(ContactChannel::Social),
            "form" => Some(ContactChannel::Form),
            "other" => Some(ContactChannel::Other),
            _ => None,
        }
    }
}

/// One outreach attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: String,
    pub match_id: String,
    pub channel: ContactChannel,
    pub summary: String,
    pub contacted_at: DateTime<Utc>,
}

/// Request to log an outreach attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordContactRequest {
    pub channel: ContactChannel,
    #[serde(default)]
    pub summary: String,
    /// Defaults to now.
    #[serde(default)]
    pub contacted_at: Option<DateTime<Utc>>,
}

/// A named group of saved matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}
