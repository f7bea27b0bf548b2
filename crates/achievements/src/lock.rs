//! Distributed award locks.
//!
//! An award lock serializes the check-then-insert sequence for one
//! `(user, badge)` pair across every process. The backing store must be
//! shared by all processes; a process-local mutex does not qualify.

use std::time::Duration;

use async_trait::async_trait;
use catchlog_core::types::DbId;
use uuid::Uuid;

use crate::error::LockError;

/// Key prefix for award locks.
pub const LOCK_KEY_PREFIX: &str = "badge:processing:";

/// Lock key for an award attempt on `(user_id, badge_code)`.
pub fn award_lock_key(user_id: DbId, badge_code: &str) -> String {
    format!("{LOCK_KEY_PREFIX}{user_id}:{badge_code}")
}

/// A held lease. Releasing it only frees the key if this lease still owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockLease {
    pub key: String,
    pub token: Uuid,
}

impl LockLease {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: Uuid::new_v4(),
        }
    }
}

/// TTL-bound, key-scoped mutual exclusion.
#[async_trait]
pub trait AwardLock: Send + Sync {
    /// Take the lock on `key` for at most `ttl`.
    ///
    /// Never waits: returns `Ok(None)` immediately when another live lease
    /// holds the key.
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockLease>, LockError>;

    /// Release a lease. Releasing an expired or taken-over lease is not an error.
    async fn release(&self, lease: &LockLease) -> Result<(), LockError>;
}
