//! WebSocket infrastructure for room subscriptions.
//!
//! Provides connection management, heartbeat monitoring, and the HTTP
//! upgrade handler used by the room routes.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
