//! Route definitions for the `/feed` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::feed;
use crate::state::AppState;

/// Routes mounted at `/feed`.
///
/// ```text
/// GET /   -> load_feed (?reset=true restarts the window)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(feed::load_feed))
}
