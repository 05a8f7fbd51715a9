//! Row model for the `clips` table.

use clipvault_core::catalog::CatalogEntry;
use clipvault_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `clips` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Clip {
    pub id: DbId,
    pub owner_id: String,
    pub owner_display_name: String,
    pub title: String,
    pub video_file_name: String,
    pub video_url: String,
    pub screenshot_file_name: String,
    pub screenshot_url: String,
    pub created_at: Timestamp,
}

impl From<Clip> for CatalogEntry {
    fn from(row: Clip) -> Self {
        CatalogEntry {
            id: row.id,
            owner_id: row.owner_id,
            owner_display_name: row.owner_display_name,
            title: row.title,
            video_file_name: row.video_file_name,
            video_url: row.video_url,
            screenshot_file_name: row.screenshot_file_name,
            screenshot_url: row.screenshot_url,
            created_at: row.created_at,
        }
    }
}
