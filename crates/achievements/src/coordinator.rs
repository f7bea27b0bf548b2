//! The exactly-once award protocol.
//!
//! For one `(user, badge)` pair, [`AwardCoordinator::award`] runs:
//!
//! 1. try-acquire the award lock (busy: skip, no retry),
//! 2. ledger check (already awarded: skip),
//! 3. re-validate the badge code and user id (missing: `NotFound`),
//! 4. insert the award record,
//! 5. release the lock on every path that acquired it,
//! 6. return the notification for the new record.
//!
//! The ledger check and insert are not one atomic operation, so the lock is
//! what serializes them per pair across processes. The ledger's unique
//! constraint backs it up: a conflicting insert counts as already awarded.

use std::sync::Arc;
use std::time::Duration;

use catchlog_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::Serialize;

use crate::error::AwardError;
use crate::gateway::ActivityGateway;
use crate::ledger::{AwardRecord, BadgeLedger, CatalogBadge};
use crate::lock::{award_lock_key, AwardLock};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Payload handed to the delivery collaborator after a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeNotification {
    pub user_id: DbId,
    pub badge_code: String,
    pub badge_name: String,
    pub badge_description: String,
    pub badge_image_ref: String,
    pub achieved_at: Timestamp,
}

impl BadgeNotification {
    fn new(badge: &CatalogBadge, record: &AwardRecord) -> Self {
        Self {
            user_id: record.user_id,
            badge_code: badge.code.clone(),
            badge_name: badge.display_name.clone(),
            badge_description: badge.description.clone(),
            badge_image_ref: badge.image_ref.clone(),
            achieved_at: record.achieved_at,
        }
    }
}

/// Non-error result of an award attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwardOutcome {
    Granted(BadgeNotification),
    /// Another attempt holds the lock for this pair.
    SkippedLocked,
    SkippedAlreadyAwarded,
}

// ---------------------------------------------------------------------------
// AwardCoordinator
// ---------------------------------------------------------------------------

/// Grants badges under a per-pair distributed lock.
pub struct AwardCoordinator {
    gateway: Arc<dyn ActivityGateway>,
    ledger: Arc<dyn BadgeLedger>,
    lock: Arc<dyn AwardLock>,
    lock_ttl: Duration,
}

impl AwardCoordinator {
    pub fn new(
        gateway: Arc<dyn ActivityGateway>,
        ledger: Arc<dyn BadgeLedger>,
        lock: Arc<dyn AwardLock>,
        lock_ttl: Duration,
    ) -> Self {
        Self {
            gateway,
            ledger,
            lock,
            lock_ttl,
        }
    }

    /// Attempt to grant `badge_code` to `user_id`.
    ///
    /// Contention and repeat grants are ordinary outcomes, not errors.
    /// Errors are referential anomalies ([`AwardError::is_not_found`]) or
    /// collaborator failures; in both cases the lock has been released (or
    /// will expire if the release itself failed).
    pub async fn award(&self, user_id: DbId, badge_code: &str) -> Result<AwardOutcome, AwardError> {
        let key = award_lock_key(user_id, badge_code);

        let Some(lease) = self.lock.try_acquire(&key, self.lock_ttl).await? else {
            tracing::debug!(user_id, badge_code, "Award lock busy, skipping");
            return Ok(AwardOutcome::SkippedLocked);
        };

        let result = self.grant_under_lock(user_id, badge_code).await;

        if let Err(e) = self.lock.release(&lease).await {
            // The lease expires on its own; nothing else to do.
            tracing::warn!(
                error = %e,
                user_id,
                badge_code,
                "Failed to release award lock"
            );
        }

        result
    }

    async fn grant_under_lock(
        &self,
        user_id: DbId,
        badge_code: &str,
    ) -> Result<AwardOutcome, AwardError> {
        if self.ledger.exists_award(user_id, badge_code).await? {
            tracing::debug!(user_id, badge_code, "Badge already awarded");
            return Ok(AwardOutcome::SkippedAlreadyAwarded);
        }

        let badge = self
            .ledger
            .find_badge_by_code(badge_code)
            .await?
            .ok_or_else(|| AwardError::BadgeNotFound {
                code: badge_code.to_string(),
            })?;

        if self.gateway.find_user_by_id(user_id).await?.is_none() {
            return Err(AwardError::UserNotFound { user_id });
        }

        let Some(record) = self.ledger.insert_award(user_id, &badge, Utc::now()).await? else {
            tracing::debug!(user_id, badge_code, "Award insert conflicted, already awarded");
            return Ok(AwardOutcome::SkippedAlreadyAwarded);
        };

        tracing::info!(user_id, badge_code, "Badge awarded");
        Ok(AwardOutcome::Granted(BadgeNotification::new(&badge, &record)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
