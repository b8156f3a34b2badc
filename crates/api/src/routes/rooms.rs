use axum::routing::{get, put};
use axum::Router;

use crate::handlers::rooms;
use crate::state::AppState;
use crate::ws;

/// Room routes mounted at `/rooms`.
///
/// ```text
/// GET    /{room}/assets          -> list_assets
/// PUT    /{room}/assets/{id}     -> upsert_asset
/// DELETE /{room}/assets/{id}     -> delete_asset
/// GET    /{room}/ws              -> ws_handler
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{room}/assets", get(rooms::list_assets))
        .route(
            "/{room}/assets/{id}",
            put(rooms::upsert_asset).delete(rooms::delete_asset),
        )
        .route("/{room}/ws", get(ws::ws_handler))
}
