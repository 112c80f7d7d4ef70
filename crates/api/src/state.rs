use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::LifecycleEngine;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: keydesk_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// The lifecycle engine: the only writer of request/room state.
    pub engine: Arc<LifecycleEngine>,
    /// Centralized event bus for publishing domain events.
    pub event_bus: Arc<keydesk_events::EventBus>,
}
