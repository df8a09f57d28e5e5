//! Saved matches: what a user did with the podcasts they were shown.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteMatchStore;
pub use store::{MatchStore, MatchStoreError, SavedMatchFilter};
pub use types::*;
