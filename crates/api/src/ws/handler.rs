use std::sync::Arc;

use assetroom_core::asset::Asset;
use assetroom_core::protocol::RoomMessage;
use assetroom_core::room::normalize_room_id;
use assetroom_events::RoomHub;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{Sink, SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// HTTP handler that upgrades the connection to a room snapshot stream.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> impl IntoResponse {
    let room = normalize_room_id(&room);
    ws.on_upgrade(move |socket| handle_socket(socket, room, state))
}

/// Manage a single room subscription after upgrade.
///
///   1. Registers the connection with `WsManager`.
///   2. Takes a snapshot and a change receiver from the hub atomically.
///   3. Spawns a sender task that pushes the initial snapshot, then a fresh
///      snapshot after every change in the room, interleaved with control
///      frames from the manager.
///   4. Processes inbound frames on the current task until the client leaves.
async fn handle_socket(socket: WebSocket, room: String, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, room = %room, "Room subscriber connected");

    let mut control = state.ws_manager.add(conn_id.clone(), room.clone()).await;
    let (initial, mut changes) = state.hub.watch(&room);
    let hub = Arc::clone(&state.hub);

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let sender_room = room.clone();
    let send_task = tokio::spawn(async move {
        if send_snapshot(&mut sink, &sender_room, initial).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                msg = control.recv() => {
                    let Some(msg) = msg else { break };
                    let closing = matches!(msg, Message::Close(_));
                    if sink.send(msg).await.is_err() || closing {
                        break;
                    }
                }
                change = changes.recv() => {
                    let resend = match change {
                        Ok(change) => change.room == sender_room,
                        Err(RecvError::Lagged(n)) => {
                            tracing::warn!(conn_id = %sender_conn_id, skipped = n, "Subscriber lagged");
                            true
                        }
                        Err(RecvError::Closed) => break,
                    };
                    if resend && push_latest(&mut sink, &hub, &sender_room).await.is_err() {
                        tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                        break;
                    }
                }
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {
                // Subscribers only listen; writes go through the REST routes.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, room = %room, "Room subscriber disconnected");
}

async fn push_latest<S>(sink: &mut S, hub: &RoomHub, room: &str) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    send_snapshot(sink, room, hub.snapshot(room)).await
}

/// Serialize and send one snapshot frame.
async fn send_snapshot<S>(sink: &mut S, room: &str, assets: Vec<Asset>) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let message = RoomMessage::Snapshot {
        room: room.to_string(),
        assets,
    };
    let json = serde_json::to_string(&message).map_err(axum::Error::new)?;
    sink.send(Message::Text(json.into())).await
}
