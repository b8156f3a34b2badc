//! Handlers for room documents.
//!
//! Room ids in the path are normalized by the hub, so `/rooms/Team-X` and
//! `/rooms/team-x` address the same room.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/rooms/{room}/assets
///
/// The room's records, newest first. An unknown room is simply empty.
pub async fn list_assets(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> AppResult<impl IntoResponse> {
    let assets = state.hub.snapshot(&room);

    Ok(Json(DataResponse { data: assets }))
}

/// PUT /api/v1/rooms/{room}/assets/{id}
///
/// Merge the body's fields into the document. Fields not in the body keep
/// their stored values; an `id` field in the body is ignored.
pub async fn upsert_asset(
    State(state): State<AppState>,
    Path((room, id)): Path<(String, String)>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(fields) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let asset = state.hub.upsert(&room, &id, fields)?;

    Ok(Json(DataResponse { data: asset }))
}

/// DELETE /api/v1/rooms/{room}/assets/{id}
///
/// Always 204; deleting a missing document is not an error.
pub async fn delete_asset(
    State(state): State<AppState>,
    Path((room, id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let existed = state.hub.delete(&room, &id);
    tracing::debug!(room = %room, asset_id = %id, existed, "Delete requested");

    Ok(StatusCode::NO_CONTENT)
}
