//! Upload-and-publish pipeline.
//!
//! [`session::UploadSession`] owns one attempt to preprocess, upload,
//! and publish a single clip; [`feed::Feed`] maintains the cursor-paged
//! recency window over the catalog.

pub mod feed;
pub mod session;

pub use feed::{Feed, FeedError, PAGE_SIZE};
pub use session::{
    PipelineError, PublisherIdentity, Screenshot, SessionState, SessionStatus, SourceVideo,
    UploadSession,
};
