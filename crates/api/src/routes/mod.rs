//! Route registration.

use axum::Router;

use crate::state::AppState;

pub mod clips;
pub mod feed;
pub mod health;
pub mod uploads;
pub mod users;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/uploads", uploads::router())
        .nest("/clips", clips::router())
        .nest("/feed", feed::router())
        .nest("/users", users::router())
}
