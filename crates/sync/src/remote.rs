//! Room sync over HTTP and a WebSocket snapshot stream.
//!
//! Writes go through the room server's REST endpoints; subscriptions hold a
//! WebSocket open on `/api/v1/rooms/{room}/ws` and reconnect with
//! exponential backoff whenever it drops.

use assetroom_core::asset::Asset;
use assetroom_core::protocol::{RoomMessage, API_PREFIX};
use assetroom_core::room::normalize_room_id;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Url;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::reconnect::{connect_with_backoff, ReconnectConfig, RoomStream};
use crate::{RoomSync, SnapshotCallback, Subscription, SyncError};

/// [`RoomSync`] client for a remote room server.
#[derive(Debug, Clone)]
pub struct RemoteRoomSync {
    client: reqwest::Client,
    base_url: Url,
    reconnect: ReconnectConfig,
}

/// Why a stream session ended.
enum SessionEnd {
    Cancelled,
    Lost,
}

impl RemoteRoomSync {
    /// Create a client for the server at `base_url`, e.g. `http://host:3000`.
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, SyncError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SyncError::Connection(format!("Invalid room server URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Connection(format!(
                "Room server URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            client,
            base_url,
            reconnect: ReconnectConfig::default(),
        })
    }

    /// Override the stream reconnection backoff.
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Build `{base}/api/v1/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(API_PREFIX.trim_start_matches('/').split('/'))
                .extend(segments);
        }
        url
    }

    fn asset_url(&self, room: &str, asset_id: &str) -> Url {
        self.endpoint(&["rooms", room, "assets", asset_id])
    }

    fn stream_url(&self, room: &str) -> Result<Url, SyncError> {
        let mut url = self.endpoint(&["rooms", room, "ws"]);
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(SyncError::Connection(format!(
                    "Unsupported room server scheme '{other}'"
                )))
            }
        };
        url.set_scheme(scheme)
            .map_err(|()| SyncError::Connection(format!("Cannot switch {url} to {scheme}")))?;
        Ok(url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SyncError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RoomSync for RemoteRoomSync {
    async fn subscribe(&self, room: &str, on_change: SnapshotCallback) -> Subscription {
        let room = normalize_room_id(room);
        let cancel = CancellationToken::new();

        let task = match self.stream_url(&room) {
            Ok(url) => tokio::spawn(run_stream(
                url.to_string(),
                room.clone(),
                on_change,
                self.reconnect.clone(),
                cancel.clone(),
            )),
            Err(e) => {
                tracing::error!(room = %room, error = %e, "Cannot open room stream");
                tokio::spawn(async {})
            }
        };

        Subscription::new(room, cancel, task)
    }

    async fn upsert(&self, room: &str, asset: &Asset) -> Result<(), SyncError> {
        let room = normalize_room_id(room);
        let response = self
            .client
            .put(self.asset_url(&room, &asset.id))
            .json(&asset.to_document())
            .send()
            .await?;

        Self::ensure_success(response).await?;
        tracing::debug!(room = %room, asset_id = %asset.id, "Remote upsert accepted");
        Ok(())
    }

    async fn delete(&self, room: &str, asset_id: &str) -> Result<(), SyncError> {
        let room = normalize_room_id(room);
        let response = self
            .client
            .delete(self.asset_url(&room, asset_id))
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }
}

/// Keep a snapshot stream open until cancelled, reconnecting on loss.
async fn run_stream(
    url: String,
    room: String,
    on_change: SnapshotCallback,
    config: ReconnectConfig,
    cancel: CancellationToken,
) {
    while let Some(stream) = connect_with_backoff(&url, &config, &cancel).await {
        match run_session(stream, &room, &on_change, &cancel).await {
            SessionEnd::Cancelled => break,
            SessionEnd::Lost => {
                tracing::warn!(room = %room, "Room stream lost, reconnecting");
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(config.initial_delay) => {}
                }
            }
        }
    }
    tracing::debug!(room = %room, "Room stream stopped");
}

/// Drive a single connection, delivering snapshots for `room`.
async fn run_session(
    mut stream: RoomStream,
    room: &str,
    on_change: &SnapshotCallback,
    cancel: &CancellationToken,
) -> SessionEnd {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = stream.close(None).await;
                return SessionEnd::Cancelled;
            }
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = handle_text(&text, room, on_change) {
                        tracing::warn!(room, error = %e, "Ignoring room stream message");
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(room, ?frame, "Room server closed stream");
                    return SessionEnd::Lost;
                }
                Some(Ok(_)) => {
                    // Ping/pong are answered by tungstenite; binary is unused.
                }
                Some(Err(e)) => {
                    tracing::warn!(room, error = %e, "Room stream receive error");
                    return SessionEnd::Lost;
                }
                None => return SessionEnd::Lost,
            },
        }
    }
}

fn handle_text(text: &str, room: &str, on_change: &SnapshotCallback) -> Result<(), SyncError> {
    let message: RoomMessage =
        serde_json::from_str(text).map_err(|e| SyncError::Protocol(e.to_string()))?;

    match message {
        RoomMessage::Snapshot { room: from, assets } if from == room => {
            on_change(assets);
            Ok(())
        }
        RoomMessage::Snapshot { room: from, .. } => Err(SyncError::Protocol(format!(
            "snapshot for room '{from}' on stream for '{room}'"
        ))),
        RoomMessage::Error { message } => Err(SyncError::Protocol(message)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn urls_are_built_under_api_prefix() {
        let sync = RemoteRoomSync::new("http://rooms.local:3000/").unwrap();
        assert_eq!(
            sync.asset_url("team-x", "a 1").as_str(),
            "http://rooms.local:3000/api/v1/rooms/team-x/assets/a%201"
        );
        assert_eq!(
            sync.stream_url("team-x").unwrap().as_str(),
            "ws://rooms.local:3000/api/v1/rooms/team-x/ws"
        );
    }

    #[test]
    fn https_streams_use_wss() {
        let sync = RemoteRoomSync::new("https://rooms.example.com/base").unwrap();
        assert_eq!(
            sync.stream_url("r").unwrap().as_str(),
            "wss://rooms.example.com/base/api/v1/rooms/r/ws"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert_matches!(RemoteRoomSync::new("not a url"), Err(SyncError::Connection(_)));
        assert_matches!(RemoteRoomSync::new("mailto:x@y.z"), Err(SyncError::Connection(_)));
    }

    #[test]
    fn only_matching_snapshots_reach_the_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: SnapshotCallback = Arc::new(move |assets: Vec<Asset>| {
            sink.lock().unwrap().push(assets.len());
        });

        let ok = r#"{"type":"snapshot","room":"r","assets":[{"id":"a","name":"A"}]}"#;
        let other = r#"{"type":"snapshot","room":"x","assets":[]}"#;
        handle_text(ok, "r", &callback).unwrap();
        assert_matches!(handle_text(other, "r", &callback), Err(SyncError::Protocol(_)));
        assert_matches!(handle_text("garbage", "r", &callback), Err(SyncError::Protocol(_)));

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }
}
