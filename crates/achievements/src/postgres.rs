//! Postgres-backed implementations of the engine's storage seams.

use std::time::Duration;

use async_trait::async_trait;
use catchlog_core::badges::BadgeDefinition;
use catchlog_core::types::{DbId, Timestamp};
use catchlog_db::models::badge::Badge;
use catchlog_db::repositories::{
    BadgeLockRepo, BadgeRepo, CommentRepo, PostRepo, UserBadgeRepo, UserRepo,
};
use catchlog_db::DbPool;

use crate::error::{LockError, StoreError};
use crate::gateway::{ActivityGateway, UserRef};
use crate::ledger::{AwardRecord, BadgeLedger, CatalogBadge};
use crate::lock::{AwardLock, LockLease};

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Activity gateway and badge ledger over the application database.
#[derive(Clone)]
pub struct PgAchievementStore {
    pool: DbPool,
}

impl PgAchievementStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<Badge> for CatalogBadge {
    fn from(badge: Badge) -> Self {
        Self {
            id: badge.id,
            code: badge.code,
            display_name: badge.display_name,
            description: badge.description,
            image_ref: badge.image_ref,
        }
    }
}

#[async_trait]
impl ActivityGateway for PgAchievementStore {
    async fn count_posts_by_user(&self, user_id: DbId) -> Result<i64, StoreError> {
        Ok(PostRepo::count_by_author(&self.pool, user_id).await?)
    }

    async fn count_comments_by_user(&self, user_id: DbId) -> Result<i64, StoreError> {
        Ok(CommentRepo::count_by_author(&self.pool, user_id).await?)
    }

    async fn count_likes_on_post(&self, post_id: DbId) -> Result<i64, StoreError> {
        Ok(PostRepo::count_likes(&self.pool, post_id).await?)
    }

    async fn find_user_by_id(&self, user_id: DbId) -> Result<Option<UserRef>, StoreError> {
        let user = UserRepo::find_by_id(&self.pool, user_id).await?;
        Ok(user.map(|u| UserRef {
            id: u.id,
            username: u.username,
        }))
    }
}

#[async_trait]
impl BadgeLedger for PgAchievementStore {
    async fn count_badges(&self) -> Result<i64, StoreError> {
        Ok(BadgeRepo::count(&self.pool).await?)
    }

    async fn insert_badge(&self, definition: &BadgeDefinition) -> Result<bool, StoreError> {
        Ok(BadgeRepo::insert(&self.pool, definition).await?.is_some())
    }

    async fn find_badge_by_code(&self, code: &str) -> Result<Option<CatalogBadge>, StoreError> {
        let badge = BadgeRepo::find_by_code(&self.pool, code).await?;
        Ok(badge.map(CatalogBadge::from))
    }

    async fn exists_award(&self, user_id: DbId, badge_code: &str) -> Result<bool, StoreError> {
        Ok(UserBadgeRepo::exists(&self.pool, user_id, badge_code).await?)
    }

    async fn insert_award(
        &self,
        user_id: DbId,
        badge: &CatalogBadge,
        achieved_at: Timestamp,
    ) -> Result<Option<AwardRecord>, StoreError> {
        let row = UserBadgeRepo::insert(&self.pool, user_id, badge.id, achieved_at).await?;
        Ok(row.map(|r| AwardRecord {
            user_id: r.user_id,
            badge_code: badge.code.clone(),
            achieved_at: r.achieved_at,
        }))
    }
}

// ---------------------------------------------------------------------------
// Lock
// ---------------------------------------------------------------------------

/// Award locks stored in the shared `badge_locks` table.
///
/// Every process talks to the same database, so a lease taken here is
/// visible to all of them.
#[derive(Clone)]
pub struct PgAwardLock {
    pool: DbPool,
}

impl PgAwardLock {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AwardLock for PgAwardLock {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockLease>, LockError> {
        let lease = LockLease::new(key);
        let acquired =
            BadgeLockRepo::try_acquire(&self.pool, key, lease.token, ttl.as_secs_f64()).await?;
        Ok(acquired.then_some(lease))
    }

    async fn release(&self, lease: &LockLease) -> Result<(), LockError> {
        let released = BadgeLockRepo::release(&self.pool, &lease.key, lease.token).await?;
        if !released {
            tracing::debug!(key = %lease.key, "Award lock already expired or taken over");
        }
        Ok(())
    }
}
