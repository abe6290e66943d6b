use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (users, badges, behavior, session store).
    pub pool: stride_db::DbPool,
    /// Server configuration (accessed by the auth gate and handlers).
    pub config: Arc<ServerConfig>,
    /// Bus carrying behavior events to the achievement engine listener.
    pub event_bus: Arc<stride_events::EventBus>,
}
