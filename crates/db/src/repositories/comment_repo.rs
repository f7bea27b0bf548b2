//! Repository for the `comments` table.

use catchlog_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment};

/// Column list for `comments` queries.
const COLUMNS: &str = "id, post_id, author_id, body, created_at";

/// Provides CRUD and aggregate queries for comments.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment on `post_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        post_id: DbId,
        input: &CreateComment,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (post_id, author_id, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(post_id)
            .bind(input.author_id)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    /// Number of comments authored by a user.
    pub async fn count_by_author(pool: &PgPool, author_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(pool)
            .await
    }
}
