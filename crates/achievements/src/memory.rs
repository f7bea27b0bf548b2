//! In-memory implementations of the engine's seams.
//!
//! Compiled for tests and the `test-util` feature. The lock here is only
//! shared within one process, so it must never back a multi-process
//! deployment.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use catchlog_core::badges::BadgeDefinition;
use catchlog_core::types::{DbId, Timestamp};
use tokio::time::Instant;

use crate::coordinator::BadgeNotification;
use crate::error::{LockError, StoreError};
use crate::gateway::{ActivityGateway, UserRef};
use crate::ledger::{AwardRecord, BadgeLedger, CatalogBadge};
use crate::lock::{AwardLock, LockLease};
use crate::notifier::NotificationSink;

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// InMemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    users: HashMap<DbId, String>,
    post_counts: HashMap<DbId, i64>,
    comment_counts: HashMap<DbId, i64>,
    like_counts: HashMap<DbId, i64>,
    badges: Vec<CatalogBadge>,
    awards: Vec<AwardRecord>,
}

/// Activity gateway and badge ledger held in process memory.
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    enforce_unique: bool,
    write_delay: Option<Duration>,
    unavailable: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// An empty store that rejects duplicate awards like the real ledger.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            enforce_unique: true,
            write_delay: None,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Accept duplicate award rows, leaving the award lock as the only guard.
    pub fn without_unique_constraint(mut self) -> Self {
        self.enforce_unique = false;
        self
    }

    /// Sleep before every award insert, widening check-then-insert races.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Make every call fail with [`StoreError::Unavailable`] while `true`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn add_user(&self, id: DbId, username: &str) {
        guard(&self.state).users.insert(id, username.to_string());
    }

    /// Count one more post for `user_id`, returning the new total.
    pub fn record_post(&self, user_id: DbId) -> i64 {
        let mut state = guard(&self.state);
        let count = state.post_counts.entry(user_id).or_insert(0);
        *count += 1;
        *count
    }

    /// Count one more comment for `user_id`, returning the new total.
    pub fn record_comment(&self, user_id: DbId) -> i64 {
        let mut state = guard(&self.state);
        let count = state.comment_counts.entry(user_id).or_insert(0);
        *count += 1;
        *count
    }

    /// Count one more like on `post_id`, returning the new total.
    pub fn record_like(&self, post_id: DbId) -> i64 {
        let mut state = guard(&self.state);
        let count = state.like_counts.entry(post_id).or_insert(0);
        *count += 1;
        *count
    }

    /// Every award record, in insertion order.
    pub fn awards(&self) -> Vec<AwardRecord> {
        guard(&self.state).awards.clone()
    }

    /// Number of award records for one pair.
    pub fn award_count(&self, user_id: DbId, badge_code: &str) -> usize {
        guard(&self.state)
            .awards
            .iter()
            .filter(|a| a.user_id == user_id && a.badge_code == badge_code)
            .count()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityGateway for InMemoryStore {
    async fn count_posts_by_user(&self, user_id: DbId) -> Result<i64, StoreError> {
        self.check_available()?;
        Ok(guard(&self.state).post_counts.get(&user_id).copied().unwrap_or(0))
    }

    async fn count_comments_by_user(&self, user_id: DbId) -> Result<i64, StoreError> {
        self.check_available()?;
        Ok(guard(&self.state)
            .comment_counts
            .get(&user_id)
            .copied()
            .unwrap_or(0))
    }

    async fn count_likes_on_post(&self, post_id: DbId) -> Result<i64, StoreError> {
        self.check_available()?;
        Ok(guard(&self.state).like_counts.get(&post_id).copied().unwrap_or(0))
    }

    async fn find_user_by_id(&self, user_id: DbId) -> Result<Option<UserRef>, StoreError> {
        self.check_available()?;
        Ok(guard(&self.state).users.get(&user_id).map(|username| UserRef {
            id: user_id,
            username: username.clone(),
        }))
    }
}

#[async_trait]
impl BadgeLedger for InMemoryStore {
    async fn count_badges(&self) -> Result<i64, StoreError> {
        self.check_available()?;
        Ok(guard(&self.state).badges.len() as i64)
    }

    async fn insert_badge(&self, definition: &BadgeDefinition) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut state = guard(&self.state);
        if state.badges.iter().any(|b| b.code == definition.code) {
            return Ok(false);
        }
        let id = state.badges.len() as DbId + 1;
        state.badges.push(CatalogBadge {
            id,
            code: definition.code.clone(),
            display_name: definition.display_name.clone(),
            description: definition.description.clone(),
            image_ref: definition.image_ref.clone(),
        });
        Ok(true)
    }

    async fn find_badge_by_code(&self, code: &str) -> Result<Option<CatalogBadge>, StoreError> {
        self.check_available()?;
        Ok(guard(&self.state)
            .badges
            .iter()
            .find(|b| b.code == code)
            .cloned())
    }

    async fn exists_award(&self, user_id: DbId, badge_code: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(guard(&self.state)
            .awards
            .iter()
            .any(|a| a.user_id == user_id && a.badge_code == badge_code))
    }

    async fn insert_award(
        &self,
        user_id: DbId,
        badge: &CatalogBadge,
        achieved_at: Timestamp,
    ) -> Result<Option<AwardRecord>, StoreError> {
        self.check_available()?;
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = guard(&self.state);
        let duplicate = state
            .awards
            .iter()
            .any(|a| a.user_id == user_id && a.badge_code == badge.code);
        if duplicate && self.enforce_unique {
            return Ok(None);
        }

        let record = AwardRecord {
            user_id,
            badge_code: badge.code.clone(),
            achieved_at,
        };
        state.awards.push(record.clone());
        Ok(Some(record))
    }
}

// ---------------------------------------------------------------------------
// InMemoryAwardLock
// ---------------------------------------------------------------------------

/// Process-local award lock with TTL expiry on `tokio::time` so paused-clock
/// tests can advance past it.
#[derive(Default)]
pub struct InMemoryAwardLock {
    leases: Mutex<HashMap<String, (LockLease, Instant)>>,
    unavailable: AtomicBool,
    fail_releases: AtomicBool,
    acquisitions: AtomicUsize,
    releases: AtomicUsize,
}

impl InMemoryAwardLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `try_acquire` fail while `true`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `release` fail (without freeing the key) while `true`.
    pub fn set_fail_releases(&self, fail: bool) {
        self.fail_releases.store(fail, Ordering::SeqCst);
    }

    /// Whether a live lease holds `key`.
    pub fn is_held(&self, key: &str) -> bool {
        guard(&self.leases)
            .get(key)
            .is_some_and(|(_, expires_at)| *expires_at > Instant::now())
    }

    /// Number of leases currently stored, expired or not.
    pub fn stored_leases(&self) -> usize {
        guard(&self.leases).len()
    }

    /// Successful acquisitions so far.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Successful releases so far.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AwardLock for InMemoryAwardLock {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<LockLease>, LockError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LockError::Unavailable("in-memory lock offline".into()));
        }

        let now = Instant::now();
        let mut leases = guard(&self.leases);
        if let Some((_, expires_at)) = leases.get(key) {
            if *expires_at > now {
                return Ok(None);
            }
        }

        let lease = LockLease::new(key);
        leases.insert(key.to_string(), (lease.clone(), now + ttl));
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(Some(lease))
    }

    async fn release(&self, lease: &LockLease) -> Result<(), LockError> {
        if self.fail_releases.load(Ordering::SeqCst) {
            return Err(LockError::Unavailable("in-memory lock offline".into()));
        }

        let mut leases = guard(&self.leases);
        let owned = leases
            .get(&lease.key)
            .is_some_and(|(held, _)| held.token == lease.token);
        if owned {
            leases.remove(&lease.key);
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Notification sink that keeps every delivered notification.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<BadgeNotification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<BadgeNotification> {
        guard(&self.delivered).clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, notification: &BadgeNotification) {
        guard(&self.delivered).push(notification.clone());
    }
}
