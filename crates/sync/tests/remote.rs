//! `RemoteRoomSync` against a live room server on an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use assetroom_api::config::ServerConfig;
use assetroom_api::router::build_app_router;
use assetroom_api::state::AppState;
use assetroom_core::asset::Asset;
use assetroom_events::RoomHub;
use assetroom_sync::reconnect::ReconnectConfig;
use assetroom_sync::{RemoteRoomSync, RoomSync, SnapshotCallback, SyncError};
use tokio::sync::mpsc;

async fn spawn_server() -> (String, Arc<RoomHub>) {
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec![],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        journal_path: std::env::temp_dir().join("assetroom-sync-unused.jsonl"),
    };
    let hub = Arc::new(RoomHub::new());
    let app = build_app_router(AppState::new(config.clone(), Arc::clone(&hub)), &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), hub)
}

fn channel_callback() -> (SnapshotCallback, mpsc::UnboundedReceiver<Vec<Asset>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let callback: SnapshotCallback = Arc::new(move |assets| {
        let _ = tx.send(assets);
    });
    (callback, rx)
}

async fn next(rx: &mut mpsc::UnboundedReceiver<Vec<Asset>>) -> Vec<Asset> {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("snapshot within timeout")
        .expect("channel open")
}

fn widget(id: &str, created_at: i64) -> Asset {
    Asset {
        id: id.into(),
        name: format!("Widget {id}"),
        sku: "W1".into(),
        created_at,
        ..Default::default()
    }
}

#[tokio::test]
async fn subscribe_then_write_round_trips_through_server() {
    let (base, hub) = spawn_server().await;
    let sync = RemoteRoomSync::new(&base).unwrap();
    let (callback, mut rx) = channel_callback();

    let sub = sync.subscribe(" Team-X ", callback).await;
    assert_eq!(sub.room(), "team-x");
    assert!(next(&mut rx).await.is_empty());

    sync.upsert("TEAM-X", &widget("a", 1)).await.unwrap();
    let snapshot = next(&mut rx).await;
    assert_eq!(snapshot, vec![widget("a", 1)]);

    sync.upsert("team-x", &widget("b", 2)).await.unwrap();
    let ids: Vec<_> = next(&mut rx).await.into_iter().map(|a| a.id).collect();
    assert_eq!(ids, ["b", "a"]);

    sync.delete("team-x", "a").await.unwrap();
    assert_eq!(next(&mut rx).await.len(), 1);
    assert_eq!(hub.snapshot("team-x").len(), 1);

    sub.release().await;
}

#[tokio::test]
async fn delete_of_missing_record_succeeds() {
    let (base, _) = spawn_server().await;
    let sync = RemoteRoomSync::new(&base).unwrap();

    assert!(sync.delete("r", "never-existed").await.is_ok());
}

#[tokio::test]
async fn server_rejection_surfaces_as_api_error() {
    let (base, _) = spawn_server().await;
    let sync = RemoteRoomSync::new(&base).unwrap();

    // Whitespace-only ids are refused by the hub.
    let err = sync.upsert("r", &widget(" ", 1)).await.unwrap_err();
    assert_matches!(err, SyncError::Api { status: 400, .. });
}

#[tokio::test]
async fn unreachable_server_fails_writes() {
    let sync = RemoteRoomSync::new("http://127.0.0.1:9").unwrap();

    assert_matches!(sync.upsert("r", &widget("a", 1)).await, Err(SyncError::Request(_)));
}

#[tokio::test]
async fn subscription_survives_unreachable_server_and_releases() {
    let sync = RemoteRoomSync::new("http://127.0.0.1:9")
        .unwrap()
        .with_reconnect(ReconnectConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
            multiplier: 2.0,
        });
    let (callback, mut rx) = channel_callback();

    let sub = sync.subscribe("r", callback).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!sub.is_finished(), "stream keeps retrying");

    sub.release().await;
    assert!(rx.recv().await.is_none());
}
