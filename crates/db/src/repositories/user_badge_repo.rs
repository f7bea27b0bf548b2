//! Repository for the `user_badges` award ledger.
//!
//! The ledger is append-only. The only writer is the award coordinator,
//! which calls [`UserBadgeRepo::insert`] while holding the award lock.

use catchlog_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::badge::{UserBadge, UserBadgeStatus};

/// Column list for `user_badges` queries.
const COLUMNS: &str = "id, user_id, badge_id, achieved_at";

/// Provides ledger reads, the award insert and the status projection.
pub struct UserBadgeRepo;

impl UserBadgeRepo {
    /// Whether `user_id` already holds the badge identified by `badge_code`.
    pub async fn exists(
        pool: &PgPool,
        user_id: DbId,
        badge_code: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM user_badges ub
                JOIN badges b ON b.id = ub.badge_id
                WHERE ub.user_id = $1 AND b.code = $2
            )",
        )
        .bind(user_id)
        .bind(badge_code)
        .fetch_one(pool)
        .await
    }

    /// Append an award record.
    ///
    /// Returns `None` if the `(user_id, badge_id)` pair is already present;
    /// the unique constraint is the ledger's last line of defence against a
    /// duplicate grant.
    pub async fn insert(
        pool: &PgPool,
        user_id: DbId,
        badge_id: DbId,
        achieved_at: Timestamp,
    ) -> Result<Option<UserBadge>, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_badges (user_id, badge_id, achieved_at)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_user_badges_user_badge DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserBadge>(&query)
            .bind(user_id)
            .bind(badge_id)
            .bind(achieved_at)
            .fetch_optional(pool)
            .await
    }

    /// Number of award records held by a user.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_badges WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Every catalog badge with the user's achieved status, in catalog order.
    pub async fn list_status_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserBadgeStatus>, sqlx::Error> {
        sqlx::query_as::<_, UserBadgeStatus>(
            "SELECT b.code, b.display_name, b.description, b.category,
                    b.achievement_condition, b.image_ref,
                    (ub.id IS NOT NULL) AS achieved,
                    ub.achieved_at
             FROM badges b
             LEFT JOIN user_badges ub ON ub.badge_id = b.id AND ub.user_id = $1
             ORDER BY b.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
