//! Catchlog achievement (badge) engine.
//!
//! Reacts to domain events on the [`EventBus`](catchlog_events::EventBus),
//! evaluates badge predicates for the event's recipient and grants each
//! qualifying badge exactly once:
//!
//! - [`catalog`]: startup seeding of the persisted badge catalog.
//! - [`gateway`]: read-only activity counts for predicates.
//! - [`ledger`]: badge catalog reads and the append-only award ledger.
//! - [`lock`]: TTL-bound, key-scoped award locks shared across processes.
//! - [`coordinator`]: the lock-guarded, idempotent award protocol.
//! - [`intake`]: the event consumer that fans candidates out to the coordinator.
//! - [`notifier`]: hands award notifications to a delivery collaborator.
//!
//! Storage seams are traits with a Postgres implementation in [`postgres`].
//! In-memory doubles with failure injection live in `memory`, compiled only
//! for tests or with the `test-util` feature.

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod intake;
pub mod ledger;
pub mod lock;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod notifier;
pub mod postgres;

pub use config::AchievementConfig;
pub use coordinator::{AwardCoordinator, AwardOutcome, BadgeNotification};
pub use error::{AwardError, LockError, StoreError};
pub use intake::{CandidateReport, CandidateStatus, EventIntake};
