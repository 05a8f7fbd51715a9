//! Local-filesystem blob store backend.
//!
//! Blobs live under a configured root directory mirroring their store
//! paths (`clips/{id}.mp4`, `screenshots/{id}.png`); retrieval URLs are
//! formed from a configured public base URL under which the root is
//! assumed to be served.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::{oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::{BlobStore, StorageError, UploadHandle};

/// Write chunk size (256 KiB). One progress sample is emitted per chunk.
const CHUNK_SIZE: usize = 256 * 1024;

/// [`BlobStore`] writing blobs beneath a root directory.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    /// * `root` - directory all blob paths are resolved under.
    /// * `public_base_url` - URL prefix under which `root` is served,
    ///   e.g. `http://localhost:3000/media`.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn upload(&self, path: &str, data: Vec<u8>) -> UploadHandle {
        let dest = self.resolve(path);
        let path = path.to_string();

        let (progress_tx, progress_rx) = watch::channel(0u8);
        let (result_tx, result_rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let result = write_blob(&dest, &path, &data, &progress_tx, &token).await;
            if result.is_err() {
                // Never leave a partial file behind.
                let _ = tokio::fs::remove_file(&dest).await;
            }
            let _ = result_tx.send(result);
        });

        UploadHandle::new(progress_rx, cancel, result_rx)
    }

    async fn download_url(&self, path: &str) -> Result<String, StorageError> {
        match tokio::fs::metadata(self.resolve(path)).await {
            Ok(meta) if meta.is_file() => Ok(format!("{}/{path}", self.public_base_url)),
            _ => Err(StorageError::UrlUnavailable {
                path: path.to_string(),
            }),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(()),
            // Idempotent-on-missing.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::DeleteFailed {
                path: path.to_string(),
                source,
            }),
        }
    }
}

/// Write `data` to `dest` in chunks, emitting one progress sample per
/// chunk and checking for cancellation between chunks.
async fn write_blob(
    dest: &Path,
    path: &str,
    data: &[u8],
    progress: &watch::Sender<u8>,
    cancel: &CancellationToken,
) -> Result<(), StorageError> {
    let io_err = |source: std::io::Error| StorageError::UploadFailed {
        path: path.to_string(),
        source,
    };
    let cancelled = || StorageError::Cancelled {
        path: path.to_string(),
    };

    if cancel.is_cancelled() {
        return Err(cancelled());
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
    let total = data.len();
    let mut written = 0usize;

    for chunk in data.chunks(CHUNK_SIZE) {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        file.write_all(chunk).await.map_err(io_err)?;
        written += chunk.len();

        let pct = ((written as u64 * 100) / total.max(1) as u64) as u8;
        let _ = progress.send(pct);
    }

    file.flush().await.map_err(io_err)?;
    let _ = progress.send(100);

    tracing::debug!(path, bytes = total, "Blob written");
    Ok(())
}
