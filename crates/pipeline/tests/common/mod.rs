//! In-memory fakes for the catalog store, blob store, and frame
//! extractor, with hooks for scripting failures and suspensions.

// Each test binary uses a different subset of the fakes.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use clipvault_core::catalog::{
    CatalogEntry, CatalogError, CatalogStore, NewCatalogEntry, PageCursor, SortDirection,
};
use clipvault_core::transcode::{FrameExtractor, TranscodeError};
use clipvault_core::types::DbId;
use clipvault_storage::{BlobStore, StorageError, UploadHandle};
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A minimal buffer carrying the MP4 `ftyp` signature.
pub fn mp4_bytes() -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x18];
    data.extend_from_slice(b"ftypisom");
    data.extend_from_slice(&[0xABu8; 64]);
    data
}

// ---------------------------------------------------------------------------
// FakeCatalog
// ---------------------------------------------------------------------------

/// In-memory [`CatalogStore`] with deterministic, strictly increasing
/// creation timestamps.
pub struct FakeCatalog {
    entries: Mutex<Vec<CatalogEntry>>,
    next_stamp: AtomicI64,
    page_calls: AtomicUsize,
    create_calls: AtomicUsize,
    fail_page: AtomicBool,
    fail_create: AtomicBool,
    pause: tokio::sync::Mutex<()>,
}

const STAMP_BASE: i64 = 1_700_000_000;

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
            next_stamp: AtomicI64::new(0),
            page_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            fail_page: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            pause: tokio::sync::Mutex::new(()),
        })
    }

    /// Insert `count` pre-existing entries owned by `owner`.
    pub fn seed(&self, count: usize, owner: &str) {
        for i in 0..count {
            self.insert(owner, &format!("{owner} clip {i}"));
        }
    }

    /// Insert one entry directly, bypassing `create` bookkeeping.
    pub fn insert(&self, owner: &str, title: &str) -> CatalogEntry {
        let entry = self.build_entry(owner, title);
        self.entries.lock().unwrap().push(entry.clone());
        entry
    }

    pub fn count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn fail_page(&self, fail: bool) {
        self.fail_page.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Hold the returned guard to suspend every `page` call until drop.
    pub async fn hold_pages(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.pause.lock().await
    }

    fn build_entry(&self, owner: &str, title: &str) -> CatalogEntry {
        let stamp = STAMP_BASE + self.next_stamp.fetch_add(1, Ordering::SeqCst);
        let asset = Uuid::new_v4();
        CatalogEntry {
            id: Uuid::now_v7(),
            owner_id: owner.to_string(),
            owner_display_name: format!("{owner} display"),
            title: title.to_string(),
            video_file_name: format!("{asset}.mp4"),
            video_url: format!("https://blobs.test/clips/{asset}.mp4"),
            screenshot_file_name: format!("{asset}.png"),
            screenshot_url: format!("https://blobs.test/screenshots/{asset}.png"),
            created_at: DateTime::from_timestamp(stamp, 0).unwrap(),
        }
    }

    fn sorted_desc(&self) -> Vec<CatalogEntry> {
        let mut entries = self.entries.lock().unwrap().clone();
        entries.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        entries
    }
}

#[async_trait]
impl CatalogStore for FakeCatalog {
    async fn create(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, CatalogError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(CatalogError::Store("simulated create failure".into()));
        }
        let stamp = STAMP_BASE + self.next_stamp.fetch_add(1, Ordering::SeqCst);
        let created = CatalogEntry {
            id: Uuid::now_v7(),
            owner_id: entry.owner_id,
            owner_display_name: entry.owner_display_name,
            title: entry.title,
            video_file_name: entry.video_file_name,
            video_url: entry.video_url,
            screenshot_file_name: entry.screenshot_file_name,
            screenshot_url: entry.screenshot_url,
            created_at: DateTime::from_timestamp(stamp, 0).unwrap(),
        };
        self.entries.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn rename(&self, id: DbId, title: &str) -> Result<CatalogEntry, CatalogError> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        entry.title = title.to_string();
        Ok(entry.clone())
    }

    async fn delete(&self, id: DbId) -> Result<(), CatalogError> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }

    async fn get_by_id(&self, id: DbId) -> Result<Option<CatalogEntry>, CatalogError> {
        Ok(self.entries.lock().unwrap().iter().find(|e| e.id == id).cloned())
    }

    async fn page(
        &self,
        after: Option<PageCursor>,
        limit: usize,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let _pause = self.pause.lock().await;
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_page.load(Ordering::SeqCst) {
            return Err(CatalogError::Store("simulated page failure".into()));
        }

        let entries = self.sorted_desc();
        let page = entries
            .into_iter()
            .filter(|e| match &after {
                None => true,
                Some(cursor) => (e.created_at, e.id) < (cursor.created_at, cursor.id),
            })
            .take(limit)
            .collect();
        Ok(page)
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        direction: SortDirection,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut entries: Vec<_> = self
            .sorted_desc()
            .into_iter()
            .filter(|e| e.owner_id == owner_id)
            .collect();
        if direction == SortDirection::Ascending {
            entries.reverse();
        }
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// FakeBlobStore
// ---------------------------------------------------------------------------

/// In-memory [`BlobStore`] with scripted failures and suspensions.
pub struct FakeBlobStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_prefixes: Arc<Mutex<Vec<String>>>,
    hang: Arc<AtomicBool>,
    deleted: Arc<Mutex<Vec<String>>>,
}

impl FakeBlobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            blobs: Arc::new(Mutex::new(HashMap::new())),
            fail_prefixes: Arc::new(Mutex::new(Vec::new())),
            hang: Arc::new(AtomicBool::new(false)),
            deleted: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Uploads whose path starts with `prefix` will fail.
    pub fn fail_prefix(&self, prefix: &str) {
        self.fail_prefixes.lock().unwrap().push(prefix.to_string());
    }

    /// Make every upload stall until its token is cancelled.
    pub fn hang_uploads(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().unwrap().get(path).cloned()
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn deleted_paths(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    fn upload(&self, path: &str, data: Vec<u8>) -> UploadHandle {
        let (progress_tx, progress_rx) = watch::channel(0u8);
        let (result_tx, result_rx) = oneshot::channel();
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        let blobs = self.blobs.clone();
        let hang = self.hang.clone();
        let should_fail = self
            .fail_prefixes
            .lock()
            .unwrap()
            .iter()
            .any(|p| path.starts_with(p.as_str()));
        let path = path.to_string();

        tokio::spawn(async move {
            let result = async {
                let _ = progress_tx.send(50);

                if hang.load(Ordering::SeqCst) {
                    token.cancelled().await;
                    return Err(StorageError::Cancelled { path: path.clone() });
                }

                tokio::task::yield_now().await;
                if token.is_cancelled() {
                    return Err(StorageError::Cancelled { path: path.clone() });
                }
                if should_fail {
                    return Err(StorageError::UploadFailed {
                        path: path.clone(),
                        source: std::io::Error::other("simulated upload failure"),
                    });
                }

                blobs.lock().unwrap().insert(path.clone(), data);
                let _ = progress_tx.send(100);
                Ok(())
            }
            .await;

            let _ = result_tx.send(result);
        });

        UploadHandle::new(progress_rx, cancel, result_rx)
    }

    async fn download_url(&self, path: &str) -> Result<String, StorageError> {
        if self.blobs.lock().unwrap().contains_key(path) {
            Ok(format!("https://blobs.test/{path}"))
        } else {
            Err(StorageError::UrlUnavailable {
                path: path.to_string(),
            })
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.blobs.lock().unwrap().remove(path);
        self.deleted.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeExtractor
// ---------------------------------------------------------------------------

/// [`FrameExtractor`] producing one recognizable buffer per timestamp.
pub struct FakeExtractor {
    ready_calls: AtomicUsize,
    extract_calls: AtomicUsize,
    fail: AtomicBool,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self {
            ready_calls: AtomicUsize::new(0),
            extract_calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn failing() -> Self {
        let extractor = Self::new();
        extractor.fail.store(true, Ordering::SeqCst);
        extractor
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn ready_calls(&self) -> usize {
        self.ready_calls.load(Ordering::SeqCst)
    }

    /// The buffer `extract_frames` yields for candidate `index`.
    pub fn frame_bytes(index: usize) -> Vec<u8> {
        format!("png-frame-{index}").into_bytes()
    }
}

#[async_trait]
impl FrameExtractor for FakeExtractor {
    async fn ensure_ready(&self) -> Result<(), TranscodeError> {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn extract_frames(
        &self,
        _video: &[u8],
        timestamps: &[Duration],
    ) -> Result<Vec<Vec<u8>>, TranscodeError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(TranscodeError::ExecutionFailed {
                exit_code: Some(1),
                stderr: "simulated extraction failure".into(),
            });
        }
        Ok((0..timestamps.len()).map(Self::frame_bytes).collect())
    }
}
