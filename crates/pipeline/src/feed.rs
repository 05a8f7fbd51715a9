//! Cursor-paged feed window over the catalog.
//!
//! [`Feed`] accumulates fixed-size pages of catalog entries ordered by
//! descending creation time. The window is append-only and owned by the
//! feed; callers read snapshots. An in-flight guard is kept per window,
//! not process-wide, so independent feeds can coexist.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clipvault_core::catalog::{CatalogEntry, CatalogError, CatalogStore, PageCursor, SortDirection};
use tokio::sync::Mutex;

/// Entries fetched per page load.
pub const PAGE_SIZE: usize = 6;

/// Error type for feed operations.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The range query failed. The window is unchanged and a subsequent
    /// [`Feed::load_next_page`] retries the same page.
    #[error("page fetch failed: {0}")]
    PageFetchFailed(#[from] CatalogError),
}

/// Append-only, cursor-ordered result window over the catalog's range
/// query.
pub struct Feed {
    catalog: Arc<dyn CatalogStore>,
    window: Mutex<Vec<CatalogEntry>>,
    in_flight: AtomicBool,
}

impl Feed {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog,
            window: Mutex::new(Vec::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Fetch the next page and append it to the window.
    ///
    /// Silently returns without fetching if a load is already pending.
    /// The first call fetches the newest page; subsequent calls resume
    /// after the last entry currently in the window. Entries already in
    /// the window are never re-requested as long as nothing is deleted
    /// from the backing store between loads.
    pub async fn load_next_page(&self) -> Result<(), FeedError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let result = self.fetch_and_append().await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn fetch_and_append(&self) -> Result<(), FeedError> {
        let last = {
            let window = self.window.lock().await;
            window.last().map(|entry| (entry.id, PageCursor::from(entry)))
        };

        let cursor = match last {
            None => None,
            Some((last_id, cached_cursor)) => {
                // Re-fetch the last entry for an exact ordering cursor;
                // if it was deleted in the meantime, fall back to the
                // cached key (subsequent entries may shift).
                match self.catalog.get_by_id(last_id).await? {
                    Some(fresh) => Some(PageCursor::from(&fresh)),
                    None => Some(cached_cursor),
                }
            }
        };

        let page = self.catalog.page(cursor, PAGE_SIZE).await?;
        tracing::debug!(fetched = page.len(), "Feed page loaded");

        let mut window = self.window.lock().await;
        window.extend(page);
        Ok(())
    }

    /// Snapshot of the accumulated window.
    pub async fn entries(&self) -> Vec<CatalogEntry> {
        self.window.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.window.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.window.lock().await.is_empty()
    }

    /// Discard the window so the next load starts from the newest page.
    ///
    /// Takes the same guard as [`load_next_page`](Self::load_next_page):
    /// a pending load must not append its stale page to the cleared
    /// window. Returns `false` without clearing if a load is in flight.
    pub async fn reset(&self) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.window.lock().await.clear();
        self.in_flight.store(false, Ordering::SeqCst);
        true
    }
}

/// One owner's entries, recomputed per call in the requested direction.
/// No cursor or window state.
pub async fn user_entries(
    catalog: &dyn CatalogStore,
    owner_id: &str,
    direction: SortDirection,
) -> Result<Vec<CatalogEntry>, FeedError> {
    Ok(catalog.list_by_owner(owner_id, direction).await?)
}
