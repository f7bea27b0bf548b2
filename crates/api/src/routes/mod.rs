pub mod health;
pub mod posts;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                          create user (POST)
/// /users/{id}/badges              badge status for a user (GET)
///
/// /posts                          create post (POST)
/// /posts/{id}/comments            comment on a post (POST)
/// /posts/{id}/likes               like a post (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/posts", posts::router())
}
