//! Handler for the home feed's pagination window.

use axum::extract::{Query, State};
use axum::Json;
use clipvault_core::catalog::CatalogEntry;
use clipvault_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    /// Discard the window and start over from the newest page.
    #[serde(default)]
    pub reset: bool,
}

#[derive(Debug, Serialize)]
pub struct FeedPayload {
    /// The full accumulated window, newest first.
    pub entries: Vec<CatalogEntry>,
    pub window_len: usize,
}

/// GET /feed -- load the next page (no-op if a load is already pending)
/// and return the accumulated window.
pub async fn load_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> AppResult<Json<DataResponse<FeedPayload>>> {
    if params.reset && !state.feed.reset().await {
        return Err(AppError::Core(CoreError::Conflict(
            "A page load is in flight; retry the reset".to_string(),
        )));
    }

    state.feed.load_next_page().await?;

    let entries = state.feed.entries().await;
    let window_len = entries.len();
    Ok(Json(DataResponse {
        data: FeedPayload {
            entries,
            window_len,
        },
    }))
}
