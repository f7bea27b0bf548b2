//! Badge predicates and the registry that evaluates them.
//!
//! A predicate is a pure rule: given a [`DomainEvent`] and the recipient's
//! [`ActivitySnapshot`], does this event newly satisfy the condition of one
//! badge? Predicates never perform I/O and never mutate anything, so
//! evaluating the same input twice always yields the same candidates. That
//! property is what lets at-least-once event delivery sit safely on top of
//! the exactly-once award ledger.
//!
//! New badges are added by registering another [`BadgePredicate`]; the award
//! coordinator never needs to change.

use std::collections::BTreeSet;

use crate::activity::ActivitySnapshot;
use crate::badges::BadgeKind;
use crate::domain_events::DomainEvent;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

pub const PROLIFIC_POST_COUNT: i64 = 10;
pub const CONVERSATIONALIST_COMMENT_COUNT: i64 = 50;
pub const CROWD_FAVORITE_LIKE_COUNT: i64 = 10;

/// Catch length (cm) that must be exceeded for [`BadgeKind::BigFishCatcher`].
pub const BIG_FISH_THRESHOLD_CM: f64 = 100.0;

/// Catch length (cm) that must be exceeded for [`BadgeKind::TrophyHunter`].
pub const TROPHY_FISH_THRESHOLD_CM: f64 = 200.0;

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// How a counter is compared against a milestone target.
///
/// `Exactly` fits "first" badges that must stop being proposed once the
/// count moves on. `AtLeast` fits larger targets: the snapshot is loaded when
/// the event is processed, so a later event or a redelivery may already see
/// a count past the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Exactly(i64),
    AtLeast(i64),
}

impl Milestone {
    pub fn is_reached(self, count: i64) -> bool {
        match self {
            Self::Exactly(target) => count == target,
            Self::AtLeast(target) => count >= target,
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A single, independently registerable badge rule.
pub trait BadgePredicate: Send + Sync {
    /// The badge this predicate proposes when satisfied.
    fn badge(&self) -> BadgeKind;

    /// Whether `event` satisfies the badge condition for its recipient.
    fn is_satisfied(&self, event: &DomainEvent, snapshot: &ActivitySnapshot) -> bool;
}

// ---------------------------------------------------------------------------
// Built-in predicates
// ---------------------------------------------------------------------------

/// Satisfied when the author's post count reaches `milestone`.
#[derive(Debug, Clone, Copy)]
pub struct PostMilestone {
    pub badge: BadgeKind,
    pub milestone: Milestone,
}

impl BadgePredicate for PostMilestone {
    fn badge(&self) -> BadgeKind {
        self.badge
    }

    fn is_satisfied(&self, event: &DomainEvent, snapshot: &ActivitySnapshot) -> bool {
        matches!(event, DomainEvent::PostCreated { .. }) && self.milestone.is_reached(snapshot.post_count)
    }
}

/// Satisfied when the author's comment count reaches `milestone`.
#[derive(Debug, Clone, Copy)]
pub struct CommentMilestone {
    pub badge: BadgeKind,
    pub milestone: Milestone,
}

impl BadgePredicate for CommentMilestone {
    fn badge(&self) -> BadgeKind {
        self.badge
    }

    fn is_satisfied(&self, event: &DomainEvent, snapshot: &ActivitySnapshot) -> bool {
        matches!(event, DomainEvent::CommentCreated { .. })
            && self.milestone.is_reached(snapshot.comment_count)
    }
}

/// Satisfied by a post whose recorded catch is strictly longer than `threshold_cm`.
///
/// A post without a recorded size never satisfies this predicate.
#[derive(Debug, Clone, Copy)]
pub struct FishSizeAbove {
    pub badge: BadgeKind,
    pub threshold_cm: f64,
}

impl BadgePredicate for FishSizeAbove {
    fn badge(&self) -> BadgeKind {
        self.badge
    }

    fn is_satisfied(&self, event: &DomainEvent, _snapshot: &ActivitySnapshot) -> bool {
        match event {
            DomainEvent::PostCreated {
                fish_size_cm: Some(size),
                ..
            } => *size > self.threshold_cm,
            _ => false,
        }
    }
}

/// Satisfied when the liked post's like count reaches `milestone`.
#[derive(Debug, Clone, Copy)]
pub struct LikeMilestone {
    pub badge: BadgeKind,
    pub milestone: Milestone,
}

impl BadgePredicate for LikeMilestone {
    fn badge(&self) -> BadgeKind {
        self.badge
    }

    fn is_satisfied(&self, event: &DomainEvent, snapshot: &ActivitySnapshot) -> bool {
        matches!(event, DomainEvent::PostLiked { .. })
            && snapshot
                .post_like_count
                .is_some_and(|likes| self.milestone.is_reached(likes))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered collection of predicates evaluated for every event.
#[derive(Default)]
pub struct PredicateRegistry {
    predicates: Vec<Box<dyn BadgePredicate>>,
}

impl PredicateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry holding one predicate per catalog badge.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(PostMilestone {
                badge: BadgeKind::FirstPost,
                milestone: Milestone::Exactly(1),
            })
            .register(PostMilestone {
                badge: BadgeKind::ProlificAngler,
                milestone: Milestone::AtLeast(PROLIFIC_POST_COUNT),
            })
            .register(CommentMilestone {
                badge: BadgeKind::FirstComment,
                milestone: Milestone::Exactly(1),
            })
            .register(CommentMilestone {
                badge: BadgeKind::Conversationalist,
                milestone: Milestone::AtLeast(CONVERSATIONALIST_COMMENT_COUNT),
            })
            .register(FishSizeAbove {
                badge: BadgeKind::BigFishCatcher,
                threshold_cm: BIG_FISH_THRESHOLD_CM,
            })
            .register(FishSizeAbove {
                badge: BadgeKind::TrophyHunter,
                threshold_cm: TROPHY_FISH_THRESHOLD_CM,
            })
            .register(LikeMilestone {
                badge: BadgeKind::CrowdFavorite,
                milestone: Milestone::AtLeast(CROWD_FAVORITE_LIKE_COUNT),
            });
        registry
    }

    /// Add a predicate to the registry.
    pub fn register(&mut self, predicate: impl BadgePredicate + 'static) -> &mut Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Badges whose condition `event` newly satisfies for its recipient.
    pub fn evaluate(&self, event: &DomainEvent, snapshot: &ActivitySnapshot) -> BTreeSet<BadgeKind> {
        self.predicates
            .iter()
            .filter(|p| p.is_satisfied(event, snapshot))
            .map(|p| p.badge())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
