use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: catchlog_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus that producers publish domain events on.
    pub event_bus: Arc<catchlog_events::EventBus>,
}
