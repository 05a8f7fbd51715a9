//! Domain types and pure logic shared across the clipvault workspace.
//!
//! Contains the error taxonomy, media validation, per-attempt asset
//! naming, combined-progress arithmetic, the catalog store contract,
//! and the ffmpeg-backed frame-extraction adapter.

pub mod catalog;
pub mod error;
pub mod media;
pub mod naming;
pub mod progress;
pub mod transcode;
pub mod types;
