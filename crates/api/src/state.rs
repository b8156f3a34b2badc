use std::sync::Arc;

use assetroom_events::RoomHub;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Room documents and change feed.
    pub hub: Arc<RoomHub>,
    /// WebSocket connection manager (room subscribers).
    pub ws_manager: Arc<WsManager>,
}

impl AppState {
    pub fn new(config: ServerConfig, hub: Arc<RoomHub>) -> Self {
        Self {
            config: Arc::new(config),
            hub,
            ws_manager: Arc::new(WsManager::new()),
        }
    }
}
