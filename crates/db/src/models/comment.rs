//! Comment entity model and DTOs.

use catchlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub post_id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new comment. The post id comes from the route.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateComment {
    pub author_id: DbId,
    #[validate(length(min = 1, max = 2000))]
    pub body: String,
}
