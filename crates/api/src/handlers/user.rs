//! Handlers for users and their badge status.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catchlog_core::error::CoreError;
use catchlog_core::types::DbId;
use catchlog_db::models::user::CreateUser;
use catchlog_db::repositories::{UserBadgeRepo, UserRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let user = UserRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// GET /api/v1/users/{id}/badges
///
/// Every catalog badge with the user's achieved flag and, when achieved, the
/// grant time.
pub async fn list_user_badges(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !UserRepo::exists(&state.pool, user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }

    let badges = UserBadgeRepo::list_status_for_user(&state.pool, user_id).await?;

    Ok(Json(DataResponse { data: badges }))
}
