//! Repository for the `clips` table.

use clipvault_core::catalog::{NewCatalogEntry, PageCursor, SortDirection};
use clipvault_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::clip::Clip;

const CLIP_COLUMNS: &str = "\
    id, owner_id, owner_display_name, title, video_file_name, video_url, \
    screenshot_file_name, screenshot_url, created_at";

/// Provides CRUD and ordered range queries for clips.
pub struct ClipRepo;

impl ClipRepo {
    /// Insert a new clip. The id (UUID v7) is generated here; the
    /// creation timestamp is assigned by the database.
    pub async fn create(pool: &PgPool, entry: &NewCatalogEntry) -> Result<Clip, sqlx::Error> {
        let query = format!(
            "INSERT INTO clips \
                (id, owner_id, owner_display_name, title, video_file_name, \
                 video_url, screenshot_file_name, screenshot_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {CLIP_COLUMNS}"
        );
        sqlx::query_as::<_, Clip>(&query)
            .bind(Uuid::now_v7())
            .bind(&entry.owner_id)
            .bind(&entry.owner_display_name)
            .bind(&entry.title)
            .bind(&entry.video_file_name)
            .bind(&entry.video_url)
            .bind(&entry.screenshot_file_name)
            .bind(&entry.screenshot_url)
            .fetch_one(pool)
            .await
    }

    /// Find a clip by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Clip>, sqlx::Error> {
        let query = format!("SELECT {CLIP_COLUMNS} FROM clips WHERE id = $1");
        sqlx::query_as::<_, Clip>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a clip's title. Returns the updated row, or `None` if the
    /// clip does not exist.
    pub async fn update_title(
        pool: &PgPool,
        id: DbId,
        title: &str,
    ) -> Result<Option<Clip>, sqlx::Error> {
        let query = format!(
            "UPDATE clips SET title = $2 WHERE id = $1 RETURNING {CLIP_COLUMNS}"
        );
        sqlx::query_as::<_, Clip>(&query)
            .bind(id)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Delete a clip row. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clips WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch one page ordered by descending creation time (id breaks
    /// ties), starting strictly after `after` when present.
    pub async fn page_after(
        pool: &PgPool,
        after: Option<PageCursor>,
        limit: i64,
    ) -> Result<Vec<Clip>, sqlx::Error> {
        match after {
            Some(cursor) => {
                let query = format!(
                    "SELECT {CLIP_COLUMNS} FROM clips \
                     WHERE (created_at, id) < ($1, $2) \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $3"
                );
                sqlx::query_as::<_, Clip>(&query)
                    .bind(cursor.created_at)
                    .bind(cursor.id)
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {CLIP_COLUMNS} FROM clips \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $1"
                );
                sqlx::query_as::<_, Clip>(&query)
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// All of one owner's clips ordered by creation time.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: &str,
        direction: SortDirection,
    ) -> Result<Vec<Clip>, sqlx::Error> {
        let order = match direction {
            SortDirection::Descending => "DESC",
            SortDirection::Ascending => "ASC",
        };
        let query = format!(
            "SELECT {CLIP_COLUMNS} FROM clips \
             WHERE owner_id = $1 \
             ORDER BY created_at {order}, id {order}"
        );
        sqlx::query_as::<_, Clip>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }
}
