//! SQLite-backed saved match store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, ErrorCode, OptionalExtension};
use serde::de::DeserializeOwned;
use tracing::info;

use super::store::{MatchStore, MatchStoreError, SavedMatchFilter};
use super::types::{
    Collection, ContactChannel, ContactRecord, MatchStatus, Note, RecordContactRequest, SavedMatch,
};
use crate::matching::{MatchFactors, PodcastMatch};
use crate::metrics;
use crate::results::ResultsProcessor;

const MATCH_COLUMNS: &str = "id, user_id, podcast_id, podcast_title, overall_score, confidence, \
     factors, match_reasons, status, bookmarked, created_at, updated_at, status_changed_at";

const JOINED_MATCH_COLUMNS: &str = "m.id, m.user_id, m.podcast_id, m.podcast_title, \
     m.overall_score, m.confidence, m.factors, m.match_reasons, m.status, m.bookmarked, \
     m.created_at, m.updated_at, m.status_changed_at";

/// Fixed-width UTC timestamps so text ordering equals time ordering.
fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Conversion failure for column `idx`, surfaced as a row error.
fn bad_column(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| bad_column(idx, e))
}

fn json_column<T: DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|e| bad_column(idx, e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, MatchStoreError> {
    serde_json::to_string(value).map_err(|e| MatchStoreError::Database(e.to_string()))
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// SQLite-backed saved match store.
pub struct SqliteMatchStore {
    conn: Mutex<Connection>,
}

impl SqliteMatchStore {
    /// Open or create the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, MatchStoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        info!("Opened saved match store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, MatchStoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), MatchStoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS saved_matches (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                podcast_id TEXT NOT NULL,
                podcast_title TEXT NOT NULL,
                overall_score REAL NOT NULL,
                confidence REAL NOT NULL,
                factors TEXT NOT NULL,
                match_reasons TEXT NOT NULL,
                status TEXT NOT NULL,
                bookmarked INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                status_changed_at TEXT NOT NULL,
                UNIQUE (user_id, podcast_id)
            );

            CREATE INDEX IF NOT EXISTS idx_saved_matches_user ON saved_matches(user_id);
            CREATE INDEX IF NOT EXISTS idx_saved_matches_created_at ON saved_matches(created_at);

            CREATE TABLE IF NOT EXISTS match_notes (
                id TEXT PRIMARY KEY,
                match_id TEXT NOT NULL REFERENCES saved_matches(id),
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_match_notes_match ON match_notes(match_id);

            CREATE TABLE IF NOT EXISTS contact_history (
                id TEXT PRIMARY KEY,
                match_id TEXT NOT NULL REFERENCES saved_matches(id),
                channel TEXT NOT NULL,
                summary TEXT NOT NULL,
                contacted_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_contact_history_match ON contact_history(match_id);

            CREATE TABLE IF NOT EXISTS collections (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, name)
            );

            CREATE TABLE IF NOT EXISTS collection_items (
                collection_id TEXT NOT NULL REFERENCES collections(id),
                match_id TEXT NOT NULL REFERENCES saved_matches(id),
                added_at TEXT NOT NULL,
                PRIMARY KEY (collection_id, match_id)
            );
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, MatchStoreError> {
        self.conn
            .lock()
            .map_err(|e| MatchStoreError::Database(format!("connection lock poisoned: {}", e)))
    }

    fn build_where_clause(filter: &SavedMatchFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref user_id) = filter.user_id {
            conditions.push("user_id = ?");
            params.push(Box::new(user_id.clone()));
        }

        if let Some(ref status) = filter.status {
            conditions.push("json_extract(status, '$.status') = ?");
            params.push(Box::new(status.clone()));
        }

        if let Some(bookmarked) = filter.bookmarked {
            conditions.push("bookmarked = ?");
            params.push(Box::new(bookmarked));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_match(row: &rusqlite::Row) -> rusqlite::Result<SavedMatch> {
        let factors_json: String = row.get(6)?;
        let reasons_json: String = row.get(7)?;
        let status_json: String = row.get(8)?;
        let created_at: String = row.get(10)?;
        let updated_at: String = row.get(11)?;
        let status_changed_at: String = row.get(12)?;

        let factors: MatchFactors = json_column(6, &factors_json)?;
        let match_reasons: Vec<String> = json_column(7, &reasons_json)?;
        let status: MatchStatus = json_column(8, &status_json)?;

        Ok(SavedMatch {
            id: row.get(0)?,
            user_id: row.get(1)?,
            podcast_id: row.get(2)?,
            podcast_title: row.get(3)?,
            overall_score: row.get::<_, f64>(4)? as f32,
            confidence: row.get::<_, f64>(5)? as f32,
            factors,
            match_reasons,
            status,
            bookmarked: row.get(9)?,
            created_at: parse_ts(10, &created_at)?,
            updated_at: parse_ts(11, &updated_at)?,
            status_changed_at: parse_ts(12, &status_changed_at)?,
        })
    }

    fn row_to_note(row: &rusqlite::Row) -> rusqlite::Result<Note> {
        let created_at: String = row.get(3)?;
        Ok(Note {
            id: row.get(0)?,
            match_id: row.get(1)?,
            body: row.get(2)?,
            created_at: parse_ts(3, &created_at)?,
        })
    }

    fn row_to_contact(row: &rusqlite::Row) -> rusqlite::Result<ContactRecord> {
        let channel: String = row.get(2)?;
        let contacted_at: String = row.get(4)?;
        Ok(ContactRecord {
            id: row.get(0)?,
            match_id: row.get(1)?,
            channel: ContactChannel::parse(&channel)
                .ok_or_else(|| bad_column(2, format!("unknown contact channel '{}'", channel)))?,
            summary: row.get(3)?,
            contacted_at: parse_ts(4, &contacted_at)?,
        })
    }

    fn row_to_collection(row: &rusqlite::Row) -> rusqlite::Result<Collection> {
        let created_at: String = row.get(4)?;
        Ok(Collection {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            created_at: parse_ts(4, &created_at)?,
        })
    }

    fn fetch_match(conn: &Connection, id: &str) -> Result<Option<SavedMatch>, MatchStoreError> {
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM saved_matches WHERE id = ?", MATCH_COLUMNS),
                params![id],
                Self::row_to_match,
            )
            .optional()?)
    }

    fn require_match(conn: &Connection, id: &str) -> Result<SavedMatch, MatchStoreError> {
        Self::fetch_match(conn, id)?.ok_or_else(|| MatchStoreError::not_found("Saved match", id))
    }

    fn require_collection(conn: &Connection, id: &str) -> Result<Collection, MatchStoreError> {
        conn.query_row(
            "SELECT id, user_id, name, description, created_at FROM collections WHERE id = ?",
            params![id],
            Self::row_to_collection,
        )
        .optional()?
        .ok_or_else(|| MatchStoreError::not_found("Collection", id))
    }

    fn write_status(
        conn: &Connection,
        current: SavedMatch,
        status: MatchStatus,
    ) -> Result<SavedMatch, MatchStoreError> {
        let now = Utc::now();
        conn.execute(
            "UPDATE saved_matches SET status = ?, updated_at = ?, status_changed_at = ? WHERE id = ?",
            params![to_json(&status)?, ts(&now), ts(&now), current.id],
        )?;

        metrics::MATCH_STATUS_TRANSITIONS
            .with_label_values(&[status.status_type()])
            .inc();

        Ok(SavedMatch {
            status,
            updated_at: now,
            status_changed_at: now,
            ..current
        })
    }
}

impl MatchStore for SqliteMatchStore {
    fn record_match(&self, user_id: &str, m: &PodcastMatch) -> Result<SavedMatch, MatchStoreError> {
        if user_id.trim().is_empty() {
            return Err(MatchStoreError::Invalid("user_id cannot be empty".to_string()));
        }
        if m.podcast_id.trim().is_empty() {
            return Err(MatchStoreError::Invalid(
                "podcast_id cannot be empty".to_string(),
            ));
        }
        ResultsProcessor::validate(std::slice::from_ref(m))
            .map_err(|e| MatchStoreError::Invalid(e.to_string()))?;

        let conn = self.conn()?;
        let now = ts(&Utc::now());

        conn.execute(
            "INSERT INTO saved_matches (id, user_id, podcast_id, podcast_title, overall_score, \
             confidence, factors, match_reasons, status, bookmarked, created_at, updated_at, \
             status_changed_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?) \
             ON CONFLICT (user_id, podcast_id) DO UPDATE SET \
             podcast_title = excluded.podcast_title, \
             overall_score = excluded.overall_score, \
             confidence = excluded.confidence, \
             factors = excluded.factors, \
             match_reasons = excluded.match_reasons, \
             updated_at = excluded.updated_at",
            params![
                new_id(),
                user_id,
                m.podcast_id,
                m.title,
                m.overall_score as f64,
                m.confidence as f64,
                to_json(&m.factors)?,
                to_json(&m.match_reasons)?,
                to_json(&MatchStatus::Viewed)?,
                now,
                now,
                now,
            ],
        )?;

        let saved = conn.query_row(
            &format!(
                "SELECT {} FROM saved_matches WHERE user_id = ? AND podcast_id = ?",
                MATCH_COLUMNS
            ),
            params![user_id, m.podcast_id],
            Self::row_to_match,
        )?;
        Ok(saved)
    }

    fn get(&self, id: &str) -> Result<Option<SavedMatch>, MatchStoreError> {
        let conn = self.conn()?;
        Self::fetch_match(&conn, id)
    }

    fn list(&self, filter: &SavedMatchFilter) -> Result<Vec<SavedMatch>, MatchStoreError> {
        let conn = self.conn()?;

        let (where_clause, params) = Self::build_where_clause(filter);

        let sql = format!(
            "SELECT {} FROM saved_matches {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            MATCH_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql)?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(filter.limit));
        all_params.push(Box::new(filter.offset));

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt.query_map(param_refs.as_slice(), Self::row_to_match)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn count(&self, filter: &SavedMatchFilter) -> Result<i64, MatchStoreError> {
        let conn = self.conn()?;

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM saved_matches {}", where_clause);
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        Ok(conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))?)
    }

    fn update_status(
        &self,
        id: &str,
        status: MatchStatus,
    ) -> Result<SavedMatch, MatchStoreError> {
        let conn = self.conn()?;
        let current = Self::require_match(&conn, id)?;

        if !current.status.can_transition_to(&status) {
            return Err(MatchStoreError::InvalidTransition {
                match_id: id.to_string(),
                from: current.status.status_type().to_string(),
                to: status.status_type().to_string(),
            });
        }

        Self::write_status(&conn, current, status)
    }

    fn set_bookmark(&self, id: &str, bookmarked: bool) -> Result<SavedMatch, MatchStoreError> {
        let conn = self.conn()?;
        let current = Self::require_match(&conn, id)?;
        let now = Utc::now();

        conn.execute(
            "UPDATE saved_matches SET bookmarked = ?, updated_at = ? WHERE id = ?",
            params![bookmarked, ts(&now), id],
        )?;

        Ok(SavedMatch {
            bookmarked,
            updated_at: now,
            ..current
        })
    }

    fn add_note(&self, match_id: &str, body: &str) -> Result<Note, MatchStoreError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(MatchStoreError::Invalid("note body cannot be empty".to_string()));
        }

        let conn = self.conn()?;
        Self::require_match(&conn, match_id)?;

        let note = Note {
            id: new_id(),
            match_id: match_id.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO match_notes (id, match_id, body, created_at) VALUES (?, ?, ?, ?)",
            params![note.id, note.match_id, note.body, ts(&note.created_at)],
        )?;
        Ok(note)
    }

    fn list_notes(&self, match_id: &str) -> Result<Vec<Note>, MatchStoreError> {
        let conn = self.conn()?;
        Self::require_match(&conn, match_id)?;

        let mut stmt = conn.prepare(
            "SELECT id, match_id, body, created_at FROM match_notes WHERE match_id = ? \
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![match_id], Self::row_to_note)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_note(&self, match_id: &str, note_id: &str) -> Result<(), MatchStoreError> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM match_notes WHERE id = ? AND match_id = ?",
            params![note_id, match_id],
        )?;
        if deleted == 0 {
            return Err(MatchStoreError::not_found("Note", note_id));
        }
        Ok(())
    }

    fn record_contact(
        &self,
        match_id: &str,
        request: RecordContactRequest,
    ) -> Result<ContactRecord, MatchStoreError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let current = Self::require_match(&tx, match_id)?;

        let record = ContactRecord {
            id: new_id(),
            match_id: match_id.to_string(),
            channel: request.channel,
            summary: request.summary.trim().to_string(),
            contacted_at: request.contacted_at.unwrap_or_else(Utc::now),
        };
        tx.execute(
            "INSERT INTO contact_history (id, match_id, channel, summary, contacted_at) \
             VALUES (?, ?, ?, ?, ?)",
            params![
                record.id,
                record.match_id,
                record.channel.as_str(),
                record.summary,
                ts(&record.contacted_at),
            ],
        )?;

        if current.status == MatchStatus::Viewed {
            Self::write_status(&tx, current, MatchStatus::Contacted)?;
        }
        tx.commit()?;

        Ok(record)
    }

    fn list_contacts(&self, match_id: &str) -> Result<Vec<ContactRecord>, MatchStoreError> {
        let conn = self.conn()?;
        Self::require_match(&conn, match_id)?;

        let mut stmt = conn.prepare(
            "SELECT id, match_id, channel, summary, contacted_at FROM contact_history \
             WHERE match_id = ? ORDER BY contacted_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![match_id], Self::row_to_contact)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn create_collection(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Collection, MatchStoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MatchStoreError::Invalid(
                "collection name cannot be empty".to_string(),
            ));
        }

        let conn = self.conn()?;
        let collection = Collection {
            id: new_id(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };

        let result = conn.execute(
            "INSERT INTO collections (id, user_id, name, description, created_at) \
             VALUES (?, ?, ?, ?, ?)",
            params![
                collection.id,
                collection.user_id,
                collection.name,
                collection.description,
                ts(&collection.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(collection),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(MatchStoreError::Conflict(format!("collection '{}'", name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_collections(&self, user_id: &str) -> Result<Vec<Collection>, MatchStoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, description, created_at FROM collections \
             WHERE user_id = ? ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt.query_map(params![user_id], Self::row_to_collection)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn delete_collection(&self, id: &str) -> Result<(), MatchStoreError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        Self::require_collection(&tx, id)?;

        tx.execute(
            "DELETE FROM collection_items WHERE collection_id = ?",
            params![id],
        )?;
        tx.execute("DELETE FROM collections WHERE id = ?", params![id])?;
        tx.commit()?;
        Ok(())
    }

    fn add_to_collection(
        &self,
        collection_id: &str,
        match_id: &str,
    ) -> Result<(), MatchStoreError> {
        let conn = self.conn()?;
        let collection = Self::require_collection(&conn, collection_id)?;
        let saved = Self::require_match(&conn, match_id)?;

        if collection.user_id != saved.user_id {
            return Err(MatchStoreError::Invalid(format!(
                "match {} belongs to another user than collection {}",
                match_id, collection_id
            )));
        }

        conn.execute(
            "INSERT OR IGNORE INTO collection_items (collection_id, match_id, added_at) \
             VALUES (?, ?, ?)",
            params![collection_id, match_id, ts(&Utc::now())],
        )?;
        Ok(())
    }

    fn remove_from_collection(
        &self,
        collection_id: &str,
        match_id: &str,
    ) -> Result<bool, MatchStoreError> {
        let conn = self.conn()?;
        Self::require_collection(&conn, collection_id)?;

        let removed = conn.execute(
            "DELETE FROM collection_items WHERE collection_id = ? AND match_id = ?",
            params![collection_id, match_id],
        )?;
        Ok(removed > 0)
    }

    fn collection_matches(&self, collection_id: &str) -> Result<Vec<SavedMatch>, MatchStoreError> {
        let conn = self.conn()?;
        Self::require_collection(&conn, collection_id)?;

        let sql = format!(
            "SELECT {} FROM collection_items ci JOIN saved_matches m ON m.id = ci.match_id \
             WHERE ci.collection_id = ? ORDER BY ci.added_at ASC, ci.rowid ASC",
            JOINED_MATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![collection_id], Self::row_to_match)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
