//! Badge catalog and award ledger models.

use catchlog_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `badges` table.
///
/// `category` holds a [`catchlog_core::badges::BadgeCategory`] string,
/// enforced by a check constraint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Badge {
    pub id: DbId,
    pub code: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub achievement_condition: String,
    pub image_ref: String,
    pub created_at: Timestamp,
}

/// A row from the `user_badges` table (the award ledger).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserBadge {
    pub id: DbId,
    pub user_id: DbId,
    pub badge_id: DbId,
    pub achieved_at: Timestamp,
}

/// One catalog badge joined with a user's award, if any.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserBadgeStatus {
    pub code: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub achievement_condition: String,
    pub image_ref: String,
    pub achieved: bool,
    pub achieved_at: Option<Timestamp>,
}
