//! Handlers for the `/clips` and `/users/{uid}/clips` resources.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use clipvault_core::catalog::{CatalogEntry, SortDirection};
use clipvault_core::error::CoreError;
use clipvault_core::media;
use clipvault_core::naming::{CLIPS_PREFIX, SCREENSHOTS_PREFIX};
use clipvault_core::types::DbId;
use clipvault_pipeline::feed::user_entries;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UserClipsParams {
    /// `desc` (default) or `asc`.
    pub sort: Option<String>,
}

/// GET /clips/{id} -- fetch one published clip.
pub async fn get_clip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CatalogEntry>>> {
    let entry = state
        .catalog
        .get_by_id(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Clip", id }))?;
    Ok(Json(DataResponse { data: entry }))
}

/// PATCH /clips/{id} -- rename a clip (the only mutable field).
pub async fn rename_clip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(payload): Json<RenameRequest>,
) -> AppResult<Json<DataResponse<CatalogEntry>>> {
    media::validate_title(&payload.title)?;
    let entry = state.catalog.rename(id, payload.title.trim()).await?;
    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /clips/{id} -- remove the catalog record and both underlying
/// blobs. Blob removal is best-effort; a failed delete is logged and
/// does not block record removal.
pub async fn delete_clip(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let entry = state
        .catalog
        .get_by_id(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Clip", id }))?;

    for path in [
        format!("{CLIPS_PREFIX}/{}", entry.video_file_name),
        format!("{SCREENSHOTS_PREFIX}/{}", entry.screenshot_file_name),
    ] {
        if let Err(err) = state.blob.delete(&path).await {
            tracing::warn!(clip = %id, path, error = %err, "Blob deletion failed");
        }
    }

    state.catalog.delete(id).await?;
    tracing::info!(clip = %id, "Clip deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/{uid}/clips -- one owner's clips, newest first by default.
pub async fn list_user_clips(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Query(params): Query<UserClipsParams>,
) -> AppResult<Json<DataResponse<Vec<CatalogEntry>>>> {
    let direction = match params.sort.as_deref() {
        None | Some("desc") => SortDirection::Descending,
        Some("asc") => SortDirection::Ascending,
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Invalid sort '{other}'. Expected 'asc' or 'desc'"
            )))
        }
    };

    let entries = user_entries(state.catalog.as_ref(), &uid, direction).await?;
    Ok(Json(DataResponse { data: entries }))
}
