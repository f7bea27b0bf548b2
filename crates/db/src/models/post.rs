//! Post and like models and DTOs.

use catchlog_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub fish_species: Option<String>,
    /// Length of the catch in centimetres, if the author recorded one.
    pub fish_size_cm: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePost {
    pub author_id: DbId,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
    #[validate(length(max = 100))]
    pub fish_species: Option<String>,
    #[validate(range(exclusive_min = 0.0, max = 10000.0))]
    pub fish_size_cm: Option<f64>,
}

/// A row from the `post_likes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostLike {
    pub id: DbId,
    pub post_id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
}
