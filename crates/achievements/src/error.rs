//! Error types for the achievement engine.

use catchlog_core::types::DbId;

/// Failure of the persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the shared lock store.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Lock store error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Lock store unavailable: {0}")]
    Unavailable(String),
}

/// Why a single award attempt failed.
///
/// Contention and "already awarded" are not errors; they are reported as
/// [`AwardOutcome`](crate::coordinator::AwardOutcome) variants.
#[derive(Debug, thiserror::Error)]
pub enum AwardError {
    #[error("User {user_id} not found")]
    UserNotFound { user_id: DbId },

    #[error("Badge {code} not found in catalog")]
    BadgeNotFound { code: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lock(#[from] LockError),
}

impl AwardError {
    /// Whether this is a referential anomaly rather than a collaborator failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound { .. } | Self::BadgeNotFound { .. })
    }
}
