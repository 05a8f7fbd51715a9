//! Upload session state machine.
//!
//! One [`UploadSession`] covers a single attempt to publish one clip:
//! validate the source, capture screenshot candidates, wait for the
//! caller's selection, drive both blob uploads concurrently, and create
//! exactly one catalog record once both assets are durable. A session is
//! exclusively owned, never reused after a terminal state; a retry is a
//! brand-new session with a fresh attempt identifier.

use std::sync::Arc;
use std::time::Duration;

use clipvault_core::catalog::{CatalogEntry, CatalogStore, NewCatalogEntry};
use clipvault_core::media;
use clipvault_core::naming::AttemptId;
use clipvault_core::progress::CombinedProgress;
use clipvault_core::transcode::{FrameExtractor, TranscodeError, SCREENSHOT_TIMESTAMPS};
use clipvault_core::types::DbId;
use clipvault_storage::{BlobStore, StorageError, UploadHandle};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Error type for the upload-and-publish pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Rejected before any transcode or network call.
    #[error("unsupported media: {0}")]
    UnsupportedMedia(String),

    /// Screenshot capture failed; the session is discarded.
    #[error("screenshot capture failed: {0}")]
    TranscodeFailed(#[from] TranscodeError),

    /// Either blob upload failed or was cancelled.
    #[error("upload failed: {0}")]
    UploadFailed(#[from] StorageError),

    /// The catalog create (or URL resolution) failed after both uploads
    /// succeeded. No catalog record exists.
    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("no screenshot candidate at index {0}")]
    InvalidSelection(usize),

    #[error("invalid title: {0}")]
    InvalidTitle(String),
}

/// Lifecycle of one upload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    CapturingScreenshots,
    AwaitingSelection,
    Uploading,
    Publishing,
    Succeeded,
    Failed,
}

/// Snapshot published through the session's status channel.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    /// Combined upload progress in `0.0..=1.0`, the average of both
    /// asset fractions. Monotonically non-decreasing.
    pub progress: f32,
    /// Set once the catalog create returned a record id.
    pub clip_id: Option<DbId>,
    /// Set on terminal failure.
    pub error: Option<String>,
}

impl SessionStatus {
    fn new(state: SessionState) -> Self {
        Self {
            state,
            progress: 0.0,
            clip_id: None,
            error: None,
        }
    }
}

/// Externally supplied identity recorded on the catalog entry.
#[derive(Debug, Clone)]
pub struct PublisherIdentity {
    pub uid: String,
    pub display_name: String,
}

/// Raw source video handed to [`UploadSession::begin`].
#[derive(Debug, Clone)]
pub struct SourceVideo {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// One generated screenshot candidate.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub timestamp: Duration,
    pub data: Vec<u8>,
}

/// One in-memory attempt to preprocess, upload, and publish a clip.
#[derive(Debug)]
pub struct UploadSession {
    id: Uuid,
    source: SourceVideo,
    candidates: Vec<Screenshot>,
    selected: usize,
    status: watch::Sender<SessionStatus>,
    cancel: CancellationToken,
}

impl UploadSession {
    /// Validate the source and capture screenshot candidates.
    ///
    /// Rejected sources surface as [`PipelineError::UnsupportedMedia`]
    /// without touching the extractor; extraction failure discards the
    /// session ([`PipelineError::TranscodeFailed`]). On success the
    /// session is awaiting selection with the first candidate
    /// pre-selected.
    pub async fn begin(
        extractor: &dyn FrameExtractor,
        source: SourceVideo,
    ) -> Result<Self, PipelineError> {
        media::validate_source(&source.content_type, &source.data)
            .map_err(|err| PipelineError::UnsupportedMedia(err.to_string()))?;

        let (status, _) = watch::channel(SessionStatus::new(SessionState::CapturingScreenshots));

        extractor.ensure_ready().await?;
        let frames = extractor
            .extract_frames(&source.data, &SCREENSHOT_TIMESTAMPS)
            .await?;

        let candidates = SCREENSHOT_TIMESTAMPS
            .into_iter()
            .zip(frames)
            .map(|(timestamp, data)| Screenshot { timestamp, data })
            .collect();

        status.send_replace(SessionStatus::new(SessionState::AwaitingSelection));

        Ok(Self {
            id: Uuid::new_v4(),
            source,
            candidates,
            selected: 0,
            status,
            cancel: CancellationToken::new(),
        })
    }

    /// Session identifier (registry key, distinct from the per-attempt
    /// asset identifier derived at publish time).
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.status.borrow().state
    }

    pub fn candidates(&self) -> &[Screenshot] {
        &self.candidates
    }

    pub fn screenshot(&self, index: usize) -> Option<&Screenshot> {
        self.candidates.get(index)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Suggested title: the source file name minus its extension.
    pub fn default_title(&self) -> String {
        media::default_title(&self.source.file_name)
    }

    /// Subscribe to state/progress updates. Grab this before handing the
    /// session to [`publish`](Self::publish).
    pub fn status_watch(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Token that tears the session down: cancelling it while uploading
    /// cancels both in-flight blob uploads.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Choose a screenshot candidate.
    pub fn select_screenshot(&mut self, index: usize) -> Result<(), PipelineError> {
        if index >= self.candidates.len() {
            return Err(PipelineError::InvalidSelection(index));
        }
        self.selected = index;
        Ok(())
    }

    /// Upload both assets and create the catalog record.
    ///
    /// Consumes the session: it ends in `Succeeded` or `Failed` and is
    /// never resumed. Both uploads share one [`AttemptId`] derived here;
    /// the catalog create happens only after both completion signals
    /// reported success, so no record can reference a missing asset.
    pub async fn publish(
        mut self,
        blob: Arc<dyn BlobStore>,
        catalog: Arc<dyn CatalogStore>,
        identity: PublisherIdentity,
        title: String,
    ) -> Result<CatalogEntry, PipelineError> {
        media::validate_title(&title)
            .map_err(|err| PipelineError::InvalidTitle(err.to_string()))?;

        self.set_state(SessionState::Uploading);

        let attempt = AttemptId::generate();
        let video_path = attempt.video_path();
        let screenshot_path = attempt.screenshot_path();

        tracing::info!(session = %self.id, attempt = %attempt, "Starting asset uploads");

        let screenshot_data = self.candidates[self.selected].data.clone();
        let video_data = std::mem::take(&mut self.source.data);

        let video_handle = blob.upload(&video_path, video_data);
        let screenshot_handle = blob.upload(&screenshot_path, screenshot_data);

        // Tearing the session down must cancel both in-flight uploads.
        let teardown = {
            let session_token = self.cancel.clone();
            let video_token = video_handle.cancellation_token();
            let screenshot_token = screenshot_handle.cancellation_token();
            tokio::spawn(async move {
                session_token.cancelled().await;
                video_token.cancel();
                screenshot_token.cancel();
            })
        };

        let aggregator = spawn_progress_aggregator(
            self.status.clone(),
            video_handle.progress(),
            screenshot_handle.progress(),
        );

        // The two uploads are unordered relative to each other; wait for
        // both completion signals regardless of which fires first.
        let (video_result, screenshot_result) =
            tokio::join!(video_handle.join(), screenshot_handle.join());
        let _ = aggregator.await;
        teardown.abort();

        if video_result.is_err() || screenshot_result.is_err() {
            // Best-effort removal of whichever sibling already made it.
            if video_result.is_ok() {
                delete_best_effort(blob.as_ref(), &video_path).await;
            }
            if screenshot_result.is_ok() {
                delete_best_effort(blob.as_ref(), &screenshot_path).await;
            }
            let err = video_result.err().or(screenshot_result.err()).unwrap_or(
                StorageError::Aborted,
            );
            return Err(self.fail(PipelineError::UploadFailed(err)));
        }

        self.set_state(SessionState::Publishing);

        let entry = match self
            .create_record(blob.as_ref(), catalog.as_ref(), &attempt, identity, title)
            .await
        {
            Ok(entry) => entry,
            Err(err) => {
                // Both blobs are durable but no record references them;
                // remove them rather than leaving orphaned storage.
                delete_best_effort(blob.as_ref(), &video_path).await;
                delete_best_effort(blob.as_ref(), &screenshot_path).await;
                return Err(self.fail(err));
            }
        };

        tracing::info!(session = %self.id, clip = %entry.id, "Clip published");

        self.status.send_modify(|s| {
            s.state = SessionState::Succeeded;
            s.progress = 1.0;
            s.clip_id = Some(entry.id);
        });

        Ok(entry)
    }

    /// Resolve both download URLs and perform exactly one catalog
    /// create. Any failure here is `PublishFailed`.
    async fn create_record(
        &self,
        blob: &dyn BlobStore,
        catalog: &dyn CatalogStore,
        attempt: &AttemptId,
        identity: PublisherIdentity,
        title: String,
    ) -> Result<CatalogEntry, PipelineError> {
        let publish_err = |err: String| PipelineError::PublishFailed(err);

        let video_url = blob
            .download_url(&attempt.video_path())
            .await
            .map_err(|e| publish_err(e.to_string()))?;
        let screenshot_url = blob
            .download_url(&attempt.screenshot_path())
            .await
            .map_err(|e| publish_err(e.to_string()))?;

        catalog
            .create(NewCatalogEntry {
                owner_id: identity.uid,
                owner_display_name: identity.display_name,
                title,
                video_file_name: attempt.video_file_name(),
                video_url,
                screenshot_file_name: attempt.screenshot_file_name(),
                screenshot_url,
            })
            .await
            .map_err(|e| publish_err(e.to_string()))
    }

    fn set_state(&self, state: SessionState) {
        self.status.send_modify(|s| s.state = state);
    }

    fn fail(&self, err: PipelineError) -> PipelineError {
        tracing::warn!(session = %self.id, error = %err, "Upload session failed");
        self.status.send_modify(|s| {
            s.state = SessionState::Failed;
            s.error = Some(err.to_string());
        });
        err
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        // Discarding the session while uploads are in flight must
        // cancel them; after a terminal state this is a no-op.
        self.cancel.cancel();
    }
}

/// Merge both 0–100 progress streams into the session status, publishing
/// `(videoPct + screenshotPct) / 200` on every sample from either
/// stream. The published value never regresses.
fn spawn_progress_aggregator(
    status: watch::Sender<SessionStatus>,
    mut video: watch::Receiver<u8>,
    mut screenshot: watch::Receiver<u8>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut combined = CombinedProgress::new();
        let mut video_open = true;
        let mut screenshot_open = true;

        while video_open || screenshot_open {
            let fraction = tokio::select! {
                changed = video.changed(), if video_open => match changed {
                    Ok(()) => combined.set_video(*video.borrow_and_update()),
                    Err(_) => {
                        video_open = false;
                        continue;
                    }
                },
                changed = screenshot.changed(), if screenshot_open => match changed {
                    Ok(()) => combined.set_screenshot(*screenshot.borrow_and_update()),
                    Err(_) => {
                        screenshot_open = false;
                        continue;
                    }
                },
            };

            status.send_modify(|s| s.progress = s.progress.max(fraction));
        }
    })
}

async fn delete_best_effort(blob: &dyn BlobStore, path: &str) {
    if let Err(err) = blob.delete(path).await {
        tracing::warn!(path, error = %err, "Best-effort blob cleanup failed");
    }
}
