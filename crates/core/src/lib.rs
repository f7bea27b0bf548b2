//! Catchlog domain types and pure business logic.
//!
//! Nothing in this crate performs I/O. Badge predicates are evaluated
//! against pre-loaded [`activity::ActivitySnapshot`]s supplied by the
//! caller.

pub mod activity;
pub mod badges;
pub mod domain_events;
pub mod error;
pub mod predicates;
pub mod types;
