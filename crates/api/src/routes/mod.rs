pub mod health;
pub mod rooms;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /rooms/{room}/assets                 list
/// /rooms/{room}/assets/{id}            upsert (PUT), delete
/// /rooms/{room}/ws                     WebSocket snapshot stream
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/rooms", rooms::router())
}
