//! Blob store contract and backends.
//!
//! A blob store uploads caller-named byte buffers and hands back an
//! [`UploadHandle`]: a cancellable handle exposing a monotonic 0–100
//! progress stream and a completion signal distinguishing success from
//! failure. Retrieval URLs are only valid after the corresponding
//! upload completed successfully.

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

pub mod local;

pub use local::LocalBlobStore;

/// Error type for blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload of '{path}' failed: {source}")]
    UploadFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("upload of '{path}' was cancelled")]
    Cancelled { path: String },

    /// The upload task terminated without reporting a result.
    #[error("upload task aborted")]
    Aborted,

    #[error("no completed upload exists at '{path}'")]
    UrlUnavailable { path: String },

    #[error("deletion of '{path}' failed: {source}")]
    DeleteFailed {
        path: String,
        source: std::io::Error,
    },
}

/// Handle to one in-flight upload.
///
/// Progress is monotonically non-decreasing; it may stall but never
/// regresses. Dropping the handle does not cancel the upload — call
/// [`cancel`](Self::cancel) or cancel the token explicitly.
pub struct UploadHandle {
    progress: watch::Receiver<u8>,
    cancel: CancellationToken,
    result: oneshot::Receiver<Result<(), StorageError>>,
}

impl UploadHandle {
    /// Assemble a handle from its three channels. Backends (and test
    /// fakes) drive the sending halves from a spawned task.
    pub fn new(
        progress: watch::Receiver<u8>,
        cancel: CancellationToken,
        result: oneshot::Receiver<Result<(), StorageError>>,
    ) -> Self {
        Self {
            progress,
            cancel,
            result,
        }
    }

    /// Subscribe to the 0–100 progress stream.
    pub fn progress(&self) -> watch::Receiver<u8> {
        self.progress.clone()
    }

    /// Token observed by the upload task.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation of the in-flight upload.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the upload to finish.
    pub async fn join(self) -> Result<(), StorageError> {
        self.result.await.unwrap_or(Err(StorageError::Aborted))
    }
}

/// Content store for named byte buffers.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Start uploading `data` at `path`. The upload runs as a spawned
    /// task; observe and await it through the returned handle.
    fn upload(&self, path: &str, data: Vec<u8>) -> UploadHandle;

    /// Durable retrieval URL for a previously uploaded blob. Only valid
    /// after the upload's completion signal fired with success.
    async fn download_url(&self, path: &str) -> Result<String, StorageError>;

    /// Remove a blob. Missing blobs are treated as success.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}
