//! Catchlog event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the canonical event envelope, convertible to and
//!   from a typed [`DomainEvent`](catchlog_core::domain_events::DomainEvent).

pub mod bus;

pub use bus::{EventBus, PlatformEvent, EVENT_BADGE_AWARDED};
