//! Handlers for posts, comments and likes.
//!
//! Each handler writes its row, then publishes the matching domain event on
//! the bus. Badge evaluation happens asynchronously in the engine; the
//! response never waits for it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catchlog_core::domain_events::DomainEvent;
use catchlog_core::error::CoreError;
use catchlog_core::types::DbId;
use catchlog_db::models::comment::CreateComment;
use catchlog_db::models::post::{CreatePost, Post};
use catchlog_db::repositories::{CommentRepo, PostRepo, UserRepo};
use catchlog_events::PlatformEvent;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /posts/{id}/likes`.
#[derive(Debug, Deserialize)]
pub struct LikePostRequest {
    pub user_id: DbId,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// POST /api/v1/posts
pub async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<CreatePost>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    ensure_user_exists(&state, input.author_id).await?;

    let post = PostRepo::create(&state.pool, &input).await?;

    tracing::info!(post_id = post.id, author_id = post.author_id, "Post created");

    publish(
        &state,
        DomainEvent::PostCreated {
            post_id: post.id,
            author_id: post.author_id,
            fish_size_cm: post.fish_size_cm,
        },
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// POST /api/v1/posts/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    find_post(&state, post_id).await?;
    ensure_user_exists(&state, input.author_id).await?;

    let comment = CommentRepo::create(&state.pool, post_id, &input).await?;

    tracing::info!(
        comment_id = comment.id,
        post_id,
        author_id = comment.author_id,
        "Comment created"
    );

    publish(
        &state,
        DomainEvent::CommentCreated {
            comment_id: comment.id,
            post_id,
            author_id: comment.author_id,
        },
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

/// POST /api/v1/posts/{id}/likes
///
/// A user may like a post once; a repeat like is a 409.
pub async fn like_post(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(input): Json<LikePostRequest>,
) -> AppResult<impl IntoResponse> {
    let post = find_post(&state, post_id).await?;
    ensure_user_exists(&state, input.user_id).await?;

    let like = PostRepo::add_like(&state.pool, post_id, input.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "User {} already liked post {post_id}",
                input.user_id
            )))
        })?;

    tracing::debug!(post_id, user_id = input.user_id, "Post liked");

    publish(
        &state,
        DomainEvent::PostLiked {
            post_id,
            post_author_id: post.author_id,
            liker_id: input.user_id,
        },
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: like })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_post(state: &AppState, post_id: DbId) -> AppResult<Post> {
    PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))
}

async fn ensure_user_exists(state: &AppState, user_id: DbId) -> AppResult<()> {
    if UserRepo::exists(&state.pool, user_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))
    }
}

fn publish(state: &AppState, event: DomainEvent) {
    state.event_bus.publish(PlatformEvent::from_domain(&event));
}
