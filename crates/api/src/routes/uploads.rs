//! Route definitions for the `/uploads` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Routes mounted at `/uploads`.
///
/// ```text
/// POST   /                             -> create_upload (multipart)
/// GET    /{id}/screenshots/{index}     -> get_screenshot
/// POST   /{id}/select                  -> select_screenshot
/// POST   /{id}/publish                 -> publish
/// GET    /{id}/status                  -> get_status
/// DELETE /{id}                         -> discard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(uploads::create_upload).layer(DefaultBodyLimit::max(uploads::MAX_UPLOAD_BYTES)),
        )
        .route("/{id}/screenshots/{index}", get(uploads::get_screenshot))
        .route("/{id}/select", post(uploads::select_screenshot))
        .route("/{id}/publish", post(uploads::publish))
        .route("/{id}/status", get(uploads::get_status))
        .route("/{id}", delete(uploads::discard))
}
