//! Saved match storage trait and types.

use thiserror::Error;

use super::types::{Collection, ContactRecord, MatchStatus, Note, RecordContactRequest, SavedMatch};
use crate::matching::PodcastMatch;

/// Error type for saved match operations.
#[derive(Debug, Error)]
pub enum MatchStoreError {
    /// Record not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Status change not allowed from the current status.
    #[error("Cannot move match {match_id} from {from} to {to}")]
    InvalidTransition {
        match_id: String,
        from: String,
        to: String,
    },

    /// A record with the same unique key exists.
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Rejected input.
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl MatchStoreError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        MatchStoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for MatchStoreError {
    fn from(e: rusqlite::Error) -> Self {
        MatchStoreError::Database(e.to_string())
    }
}

/// Filter for listing saved matches.
#[derive(Debug, Clone, Default)]
pub struct SavedMatchFilter {
    /// Filter by owner.
    pub user_id: Option<String>,
    /// Filter by status type (e.g. "contacted").
    pub status: Option<String>,
    /// Filter by bookmark flag.
    pub bookmarked: Option<bool>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl SavedMatchFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            user_id: None,
            status: None,
            bookmarked: None,
            limit: 100,
            offset: 0,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_bookmarked(mut self, bookmarked: bool) -> Self {
        self.bookmarked = Some(bookmarked);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Storage for saved matches, notes, contact history and collections.
///
/// Saved matches are never deleted; they only move through statuses.
pub trait MatchStore: Send + Sync {
    /// Save a match for a user, or refresh the score snapshot of the one
    /// already saved for the same podcast. Status and bookmark are kept.
    fn record_match(&self, user_id: &str, m: &PodcastMatch) -> Result<SavedMatch, MatchStoreError>;

    fn get(&self, id: &str) -> Result<Option<SavedMatch>, MatchStoreError>;

    /// Newest first.
    fn list(&self, filter: &SavedMatchFilter) -> Result<Vec<SavedMatch>, MatchStoreError>;

    fn count(&self, filter: &SavedMatchFilter) -> Result<i64, MatchStoreError>;

    /// Move a match to `status` if the lifecycle allows it.
    fn update_status(&self, id: &str, status: MatchStatus)
        -> Result<SavedMatch, MatchStoreError>;

    fn set_bookmark(&self, id: &str, bookmarked: bool) -> Result<SavedMatch, MatchStoreError>;

    fn add_note(&self, match_id: &str, body: &str) -> Result<Note, MatchStoreError>;

    /// Oldest first.
    fn list_notes(&self, match_id: &str) -> Result<Vec<Note>, MatchStoreError>;

    /// Delete a note of `match_id`. A note of another match is `NotFound`.
    fn delete_note(&self, match_id: &str, note_id: &str) -> Result<(), MatchStoreError>;

    /// Log outreach. A match still at `viewed` moves to `contacted`.
    fn record_contact(
        &self,
        match_id: &str,
        request: RecordContactRequest,
    ) -> Result<ContactRecord, MatchStoreError>;

    /// Most recent first.
    fn list_contacts(&self, match_id: &str) -> Result<Vec<ContactRecord>, MatchStoreError>;

    fn create_collection(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Collection, MatchStoreError>;

    fn list_collections(&self, user_id: &str) -> Result<Vec<Collection>, MatchStoreError>;

    /// Delete a collection. The matches in it stay.
    fn delete_collection(&self, id: &str) -> Result<(), MatchStoreError>;

    /// Idempotent.
    fn add_to_collection(&self, collection_id: &str, match_id: &str)
        -> Result<(), MatchStoreError>;

    /// Returns whether the match was in the collection.
    fn remove_from_collection(
        &self,
        collection_id: &str,
        match_id: &str,
    ) -> Result<bool, MatchStoreError>;

    /// Matches in a collection, in the order they were added.
    fn collection_matches(&self, collection_id: &str) -> Result<Vec<SavedMatch>, MatchStoreError>;
}
