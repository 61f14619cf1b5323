//! API endpoints.

mod auth;
mod comments;
mod friends;
mod posts;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/friends", friends::router())
        .nest("/posts", posts::router())
        .nest("/comments", comments::router())
        .nest("/users", users::router())
}
