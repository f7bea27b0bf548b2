//! Point-in-time activity counters for a single user.

use serde::Serialize;

/// Aggregate counts loaded for the recipient of a [`DomainEvent`].
///
/// Counts include the entity that triggered the event, since producers only
/// publish after their own write has committed.
///
/// [`DomainEvent`]: crate::domain_events::DomainEvent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySnapshot {
    /// Posts authored by the recipient.
    pub post_count: i64,
    /// Comments authored by the recipient.
    pub comment_count: i64,
    /// Likes on the post referenced by the event, when the event references one
    /// and the count was loaded.
    pub post_like_count: Option<i64>,
}
