use axum::routing::post;
use axum::Router;

use crate::handlers::post as handlers;
use crate::state::AppState;

/// Post routes mounted at `/posts`.
///
/// ```text
/// POST   /                -> create_post
/// POST   /{id}/comments   -> create_comment
/// POST   /{id}/likes      -> like_post
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_post))
        .route("/{id}/comments", post(handlers::create_comment))
        .route("/{id}/likes", post(handlers::like_post))
}
