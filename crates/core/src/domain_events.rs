//! Domain events consumed by the achievement engine.
//!
//! Producers (post, comment and like workflows) publish these after their
//! own writes commit. Each variant carries the fields badge predicates need
//! so that evaluation rarely requires a second lookup.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Event type names used on the platform event bus.
pub const EVENT_POST_CREATED: &str = "post.created";
pub const EVENT_COMMENT_CREATED: &str = "comment.created";
pub const EVENT_POST_LIKED: &str = "post.liked";

/// A domain event relevant to badge evaluation.
///
/// Deserialization ignores unknown fields so producers can enrich payloads
/// without breaking the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    PostCreated {
        post_id: DbId,
        author_id: DbId,
        /// Measured length of the catch in centimetres, if recorded.
        #[serde(default)]
        fish_size_cm: Option<f64>,
    },
    CommentCreated {
        comment_id: DbId,
        post_id: DbId,
        author_id: DbId,
    },
    PostLiked {
        post_id: DbId,
        post_author_id: DbId,
        liker_id: DbId,
    },
}

impl DomainEvent {
    /// The bus event type name for this variant.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PostCreated { .. } => EVENT_POST_CREATED,
            Self::CommentCreated { .. } => EVENT_COMMENT_CREATED,
            Self::PostLiked { .. } => EVENT_POST_LIKED,
        }
    }

    /// The user whose action triggered the event.
    pub fn actor_user_id(&self) -> DbId {
        match self {
            Self::PostCreated { author_id, .. } | Self::CommentCreated { author_id, .. } => {
                *author_id
            }
            Self::PostLiked { liker_id, .. } => *liker_id,
        }
    }

    /// The user whose cumulative activity the event may complete a badge for.
    ///
    /// For likes this is the author of the liked post, not the liker.
    pub fn recipient_user_id(&self) -> DbId {
        match self {
            Self::PostLiked { post_author_id, .. } => *post_author_id,
            other => other.actor_user_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_created_tolerates_unknown_fields_and_missing_size() {
        let event: DomainEvent = serde_json::from_value(serde_json::json!({
            "type": "post_created",
            "post_id": 3,
            "author_id": 9,
            "caption": "pike at dawn",
        }))
        .unwrap();

        assert_eq!(
            event,
            DomainEvent::PostCreated {
                post_id: 3,
                author_id: 9,
                fish_size_cm: None,
            }
        );
    }

    #[test]
    fn like_recipient_is_post_author() {
        let event = DomainEvent::PostLiked {
            post_id: 1,
            post_author_id: 10,
            liker_id: 20,
        };
        assert_eq!(event.actor_user_id(), 20);
        assert_eq!(event.recipient_user_id(), 10);
        assert_eq!(event.event_type(), EVENT_POST_LIKED);
    }

    #[test]
    fn comment_recipient_is_author() {
        let event = DomainEvent::CommentCreated {
            comment_id: 4,
            post_id: 1,
            author_id: 7,
        };
        assert_eq!(event.recipient_user_id(), 7);
    }
}
