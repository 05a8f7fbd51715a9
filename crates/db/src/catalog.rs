//! Postgres-backed [`CatalogStore`] implementation.
//!
//! Thin adapter over [`ClipRepo`] that maps rows to domain entries at
//! the boundary. Decode failures surface as [`CatalogError::Decode`]
//! rather than a malformed entry.

use async_trait::async_trait;
use clipvault_core::catalog::{
    CatalogEntry, CatalogError, CatalogStore, NewCatalogEntry, PageCursor, SortDirection,
};
use clipvault_core::types::DbId;

use crate::repositories::ClipRepo;
use crate::DbPool;

/// [`CatalogStore`] over the `clips` table.
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a sqlx error to the catalog taxonomy, keeping row/column decode
/// failures distinct from transport errors.
fn map_sqlx(err: sqlx::Error) -> CatalogError {
    match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            CatalogError::Decode(err.to_string())
        }
        other => CatalogError::Store(other.to_string()),
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn create(&self, entry: NewCatalogEntry) -> Result<CatalogEntry, CatalogError> {
        ClipRepo::create(&self.pool, &entry)
            .await
            .map(Into::into)
            .map_err(map_sqlx)
    }

    async fn rename(&self, id: DbId, title: &str) -> Result<CatalogEntry, CatalogError> {
        ClipRepo::update_title(&self.pool, id, title)
            .await
            .map_err(map_sqlx)?
            .map(Into::into)
            .ok_or(CatalogError::NotFound(id))
    }

    async fn delete(&self, id: DbId) -> Result<(), CatalogError> {
        let removed = ClipRepo::delete(&self.pool, id).await.map_err(map_sqlx)?;
        if removed {
            Ok(())
        } else {
            Err(CatalogError::NotFound(id))
        }
    }

    async fn get_by_id(&self, id: DbId) -> Result<Option<CatalogEntry>, CatalogError> {
        ClipRepo::find_by_id(&self.pool, id)
            .await
            .map(|row| row.map(Into::into))
            .map_err(map_sqlx)
    }

    async fn page(
        &self,
        after: Option<PageCursor>,
        limit: usize,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        ClipRepo::page_after(&self.pool, after, limit as i64)
            .await
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(map_sqlx)
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        direction: SortDirection,
    ) -> Result<Vec<CatalogEntry>, CatalogError> {
        ClipRepo::list_by_owner(&self.pool, owner_id, direction)
            .await
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .map_err(map_sqlx)
    }
}
