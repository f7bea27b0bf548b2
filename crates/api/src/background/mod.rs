//! Background tasks started alongside the HTTP server.
//!
//! Each submodule provides a long-running async task intended to be spawned
//! via `tokio::spawn`. Tasks driven by the event bus stop when the bus is
//! dropped.

pub mod badge_engine;
