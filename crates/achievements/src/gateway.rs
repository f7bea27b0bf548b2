//! Read-only activity queries used to build predicate snapshots.

use async_trait::async_trait;
use catchlog_core::activity::ActivitySnapshot;
use catchlog_core::domain_events::DomainEvent;
use catchlog_core::types::DbId;
use serde::Serialize;

use crate::error::StoreError;

/// Minimal view of a user, enough to confirm the user exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    pub id: DbId,
    pub username: String,
}

/// Aggregate counts exposed to badge predicates.
///
/// Implementations only read; nothing here may mutate activity.
#[async_trait]
pub trait ActivityGateway: Send + Sync {
    async fn count_posts_by_user(&self, user_id: DbId) -> Result<i64, StoreError>;

    async fn count_comments_by_user(&self, user_id: DbId) -> Result<i64, StoreError>;

    async fn count_likes_on_post(&self, post_id: DbId) -> Result<i64, StoreError>;

    async fn find_user_by_id(&self, user_id: DbId) -> Result<Option<UserRef>, StoreError>;
}

/// Load the counters the predicates need for `event`'s recipient.
///
/// Only the counts relevant to the event kind are queried; the rest stay at
/// their defaults, which no predicate for that kind reads.
pub async fn load_snapshot(
    gateway: &dyn ActivityGateway,
    event: &DomainEvent,
) -> Result<ActivitySnapshot, StoreError> {
    let recipient = event.recipient_user_id();
    let mut snapshot = ActivitySnapshot::default();

    match event {
        DomainEvent::PostCreated { .. } => {
            snapshot.post_count = gateway.count_posts_by_user(recipient).await?;
        }
        DomainEvent::CommentCreated { .. } => {
            snapshot.comment_count = gateway.count_comments_by_user(recipient).await?;
        }
        DomainEvent::PostLiked { post_id, .. } => {
            snapshot.post_like_count = Some(gateway.count_likes_on_post(*post_id).await?);
        }
    }

    Ok(snapshot)
}
