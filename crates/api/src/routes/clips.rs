//! Route definitions for the `/clips` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::clips;
use crate::state::AppState;

/// Routes mounted at `/clips`.
///
/// ```text
/// GET    /{id}   -> get_clip
/// PATCH  /{id}   -> rename_clip
/// DELETE /{id}   -> delete_clip
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        get(clips::get_clip)
            .patch(clips::rename_clip)
            .delete(clips::delete_clip),
    )
}
