//! Badge catalog reads and the append-only award ledger.

use async_trait::async_trait;
use catchlog_core::badges::BadgeDefinition;
use catchlog_core::types::{DbId, Timestamp};
use serde::Serialize;

use crate::error::StoreError;

/// A persisted catalog badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogBadge {
    pub id: DbId,
    pub code: String,
    pub display_name: String,
    pub description: String,
    pub image_ref: String,
}

/// Proof that `user_id` was granted `badge_code` at `achieved_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwardRecord {
    pub user_id: DbId,
    pub badge_code: String,
    pub achieved_at: Timestamp,
}

/// Catalog and ledger storage.
///
/// The only caller of [`insert_award`](BadgeLedger::insert_award) is the
/// award coordinator, under the award lock.
#[async_trait]
pub trait BadgeLedger: Send + Sync {
    async fn count_badges(&self) -> Result<i64, StoreError>;

    /// Insert a catalog entry; `false` when the code already exists.
    async fn insert_badge(&self, definition: &BadgeDefinition) -> Result<bool, StoreError>;

    async fn find_badge_by_code(&self, code: &str) -> Result<Option<CatalogBadge>, StoreError>;

    async fn exists_award(&self, user_id: DbId, badge_code: &str) -> Result<bool, StoreError>;

    /// Append an award record.
    ///
    /// Returns `None` if the store detected an existing record for the pair
    /// (unique-constraint conflict).
    async fn insert_award(
        &self,
        user_id: DbId,
        badge: &CatalogBadge,
        achieved_at: Timestamp,
    ) -> Result<Option<AwardRecord>, StoreError>;
}
