//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::clips;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET /{uid}/clips   -> list_user_clips (?sort=desc|asc)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{uid}/clips", get(clips::list_user_clips))
}
