//! Repository for the `badge_locks` table.
//!
//! Each row is a lease on a lock key held by a random `holder` token until
//! `expires_at`. An expired row may be taken over by the next caller; there
//! is no separate reaper.

use sqlx::PgPool;
use uuid::Uuid;

/// Provides try-acquire / release for TTL-bound award locks.
pub struct BadgeLockRepo;

impl BadgeLockRepo {
    /// Take the lease on `lock_key` for `ttl_secs` unless a live lease exists.
    ///
    /// Never waits on another holder: returns `false` immediately when the
    /// key is held and not yet expired.
    pub async fn try_acquire(
        pool: &PgPool,
        lock_key: &str,
        holder: Uuid,
        ttl_secs: f64,
    ) -> Result<bool, sqlx::Error> {
        let acquired: Option<String> = sqlx::query_scalar(
            "INSERT INTO badge_locks (lock_key, holder, expires_at)
             VALUES ($1, $2, NOW() + make_interval(secs => $3))
             ON CONFLICT (lock_key) DO UPDATE
                SET holder = EXCLUDED.holder, expires_at = EXCLUDED.expires_at
                WHERE badge_locks.expires_at <= NOW()
             RETURNING lock_key",
        )
        .bind(lock_key)
        .bind(holder)
        .bind(ttl_secs)
        .fetch_optional(pool)
        .await?;
        Ok(acquired.is_some())
    }

    /// Drop the lease on `lock_key` if `holder` still owns it.
    ///
    /// Returns `false` when the lease already expired or was taken over,
    /// which callers treat as success.
    pub async fn release(pool: &PgPool, lock_key: &str, holder: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM badge_locks WHERE lock_key = $1 AND holder = $2")
            .bind(lock_key)
            .bind(holder)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether a live (unexpired) lease exists on `lock_key`.
    pub async fn is_held(pool: &PgPool, lock_key: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM badge_locks WHERE lock_key = $1 AND expires_at > NOW())",
        )
        .bind(lock_key)
        .fetch_one(pool)
        .await
    }
}
