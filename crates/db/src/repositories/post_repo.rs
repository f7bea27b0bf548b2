//! Repository for the `posts` and `post_likes` tables.

use catchlog_core::types::DbId;
use sqlx::PgPool;

use crate::models::post::{CreatePost, Post, PostLike};

/// Column list for `posts` queries.
const COLUMNS: &str =
    "id, author_id, body, fish_species, fish_size_cm, created_at, updated_at";

/// Column list for `post_likes` queries.
const LIKE_COLUMNS: &str = "id, post_id, user_id, created_at";

/// Provides CRUD and aggregate queries for posts and likes.
pub struct PostRepo;

impl PostRepo {
    /// Insert a new post, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (author_id, body, fish_species, fish_size_cm)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(input.author_id)
            .bind(&input.body)
            .bind(&input.fish_species)
            .bind(input.fish_size_cm)
            .fetch_one(pool)
            .await
    }

    /// Find a post by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of posts authored by a user.
    pub async fn count_by_author(pool: &PgPool, author_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(pool)
            .await
    }

    /// Record a like. Returns `None` if the user already liked the post.
    pub async fn add_like(
        pool: &PgPool,
        post_id: DbId,
        user_id: DbId,
    ) -> Result<Option<PostLike>, sqlx::Error> {
        let query = format!(
            "INSERT INTO post_likes (post_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_post_likes_post_user DO NOTHING
             RETURNING {LIKE_COLUMNS}"
        );
        sqlx::query_as::<_, PostLike>(&query)
            .bind(post_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of likes on a post.
    pub async fn count_likes(pool: &PgPool, post_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(pool)
            .await
    }
}
