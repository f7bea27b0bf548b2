use axum::routing::{get, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// User routes mounted at `/users`.
///
/// ```text
/// POST   /                -> create_user
/// GET    /{id}/badges     -> list_user_badges
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(user::create_user))
        .route("/{id}/badges", get(user::list_user_badges))
}
