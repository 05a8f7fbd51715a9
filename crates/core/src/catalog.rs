//! Catalog store contract.
//!
//! A catalog record describes one published clip and the two blobs it
//! links. Records are created only with every asset/identity field
//! populated — there is no persisted intermediate with a video but no
//! screenshot — and are immutable afterwards except for the title.
//!
//! The concrete Postgres implementation lives in `clipvault-db`; the
//! pipeline is written against this trait so it can be exercised with
//! in-memory stores.

use async_trait::async_trait;
use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// A published clip record.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    /// Store-assigned identifier, immutable once set.
    pub id: DbId,
    /// Identifier of the uploading user.
    pub owner_id: String,
    pub owner_display_name: String,
    /// The only field mutable after creation.
    pub title: String,
    pub video_file_name: String,
    pub video_url: String,
    pub screenshot_file_name: String,
    pub screenshot_url: String,
    /// Server-assigned creation time; the sole sort/pagination key.
    pub created_at: Timestamp,
}

/// Fields supplied to [`CatalogStore::create`]. The id and creation
/// timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewCatalogEntry {
    pub owner_id: String,
    pub owner_display_name: String,
    pub title: String,
    pub video_file_name: String,
    pub video_url: String,
    pub screenshot_file_name: String,
    pub screenshot_url: String,
}

/// Ordering direction for creation-time queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

/// Opaque cursor pointing at the last-seen entry's sort key.
///
/// The record id (UUID v7, creation-ordered) breaks ties between
/// entries sharing a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub created_at: Timestamp,
    pub id: DbId,
}

impl From<&CatalogEntry> for PageCursor {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            created_at: entry.created_at,
            id: entry.id,
        }
    }
}

/// Errors surfaced at the catalog store boundary.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog record {0} not found")]
    NotFound(DbId),

    /// A stored row could not be decoded into a [`CatalogEntry`].
    /// Surfaced as a typed error rather than a malformed entry.
    #[error("failed to decode catalog record: {0}")]
    Decode(String),

    #[error("catalog store error: {0}")]
    Store(String),
}

/// Create/read/update/delete plus ordered range queries over catalog
/// records.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist a new record. The store assigns the id and creation
    /// timestamp and returns the full entry.
    async fn create(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, CatalogError>;

    /// Update a record's title (the only mutable field).
    async fn rename(&self, id: DbId, title: &str) -> Result<CatalogEntry, CatalogError>;

    /// Remove a record. Callers pair this with best-effort deletion of
    /// both underlying blobs.
    async fn delete(&self, id: DbId) -> Result<(), CatalogError>;

    async fn get_by_id(&self, id: DbId) -> Result<Option<CatalogEntry>, CatalogError>;

    /// Fetch one page ordered by descending creation time, starting
    /// strictly after `after` when present.
    async fn page(
        &self,
        after: Option<PageCursor>,
        limit: usize,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// All of one owner's entries ordered by creation time in the
    /// requested direction. Not paginated.
    async fn list_by_owner(
        &self,
        owner_id: &str,
        direction: SortDirection,
    ) -> Result<Vec<CatalogEntry>, CatalogError>;
}
