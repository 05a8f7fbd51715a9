use std::sync::Arc;

use clipvault_core::catalog::CatalogStore;
use clipvault_core::transcode::FrameExtractor;
use clipvault_pipeline::feed::Feed;
use clipvault_storage::BlobStore;

use crate::config::ServerConfig;
use crate::sessions::SessionRegistry;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks).
    pub pool: clipvault_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Catalog of published clips.
    pub catalog: Arc<dyn CatalogStore>,
    /// Blob store for video and screenshot assets.
    pub blob: Arc<dyn BlobStore>,
    /// Screenshot frame extractor (lazily initialized).
    pub extractor: Arc<dyn FrameExtractor>,
    /// In-flight upload sessions.
    pub sessions: Arc<SessionRegistry>,
    /// The home feed's pagination window.
    pub feed: Arc<Feed>,
}
