use std::sync::Arc;

use assetroom_core::asset::Asset;
use assetroom_core::room::normalize_room_id;
use assetroom_events::RoomHub;
use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::{RoomSync, SnapshotCallback, Subscription, SyncError};

/// [`RoomSync`] backed by a hub in the same process.
#[derive(Clone)]
pub struct InProcessRoomSync {
    hub: Arc<RoomHub>,
}

impl InProcessRoomSync {
    pub fn new(hub: Arc<RoomHub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl RoomSync for InProcessRoomSync {
    async fn subscribe(&self, room: &str, on_change: SnapshotCallback) -> Subscription {
        let room = normalize_room_id(room);
        let (initial, mut changes) = self.hub.watch(&room);
        let hub = Arc::clone(&self.hub);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task_room = room.clone();

        let task = tokio::spawn(async move {
            if token.is_cancelled() {
                return;
            }
            on_change(initial);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    received = changes.recv() => match received {
                        Ok(change) if change.room == task_room => on_change(hub.snapshot(&task_room)),
                        Ok(_) => {}
                        Err(RecvError::Lagged(n)) => {
                            tracing::warn!(room = %task_room, skipped = n, "Room feed lagged, resending snapshot");
                            on_change(hub.snapshot(&task_room));
                        }
                        Err(RecvError::Closed) => {
                            tracing::info!(room = %task_room, "Room hub closed");
                            break;
                        }
                    },
                }
            }
        });

        tracing::debug!(room = %room, "Subscribed to in-process room");
        Subscription::new(room, cancel, task)
    }

    async fn upsert(&self, room: &str, asset: &Asset) -> Result<(), SyncError> {
        self.hub.upsert(room, &asset.id, asset.to_document())?;
        Ok(())
    }

    async fn delete(&self, room: &str, asset_id: &str) -> Result<(), SyncError> {
        self.hub.delete(room, asset_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    fn asset(id: &str, name: &str, created_at: i64) -> Asset {
        Asset {
            id: id.into(),
            name: name.into(),
            created_at,
            ..Default::default()
        }
    }

    fn channel_callback() -> (SnapshotCallback, mpsc::UnboundedReceiver<Vec<Asset>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let callback: SnapshotCallback = Arc::new(move |assets| {
            let _ = tx.send(assets);
        });
        (callback, rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<Vec<Asset>>) -> Vec<Asset> {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("snapshot within timeout")
            .expect("channel open")
    }

    #[tokio::test]
    async fn empty_room_delivers_empty_initial_snapshot() {
        let sync = InProcessRoomSync::new(Arc::new(RoomHub::new()));
        let (callback, mut rx) = channel_callback();

        let sub = sync.subscribe("Team-X", callback).await;
        assert_eq!(sub.room(), "team-x");
        assert!(next(&mut rx).await.is_empty());
        sub.release().await;
    }

    #[tokio::test]
    async fn every_write_produces_an_ordered_snapshot() {
        let sync = InProcessRoomSync::new(Arc::new(RoomHub::new()));
        let (callback, mut rx) = channel_callback();
        let sub = sync.subscribe("team", callback).await;
        next(&mut rx).await;

        sync.upsert("TEAM", &asset("a", "Older", 1)).await.unwrap();
        assert_eq!(next(&mut rx).await.len(), 1);

        sync.upsert("team", &asset("b", "Newer", 2)).await.unwrap();
        let names: Vec<_> = next(&mut rx).await.into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["Newer", "Older"]);

        sync.delete("team", "a").await.unwrap();
        assert_eq!(next(&mut rx).await.len(), 1);
        sub.release().await;
    }

    #[tokio::test]
    async fn other_rooms_do_not_notify() {
        let sync = InProcessRoomSync::new(Arc::new(RoomHub::new()));
        let (callback, mut rx) = channel_callback();
        let sub = sync.subscribe("mine", callback).await;
        next(&mut rx).await;

        sync.upsert("theirs", &asset("x", "X", 1)).await.unwrap();
        sync.upsert("mine", &asset("y", "Y", 1)).await.unwrap();

        let snapshot = next(&mut rx).await;
        assert_eq!(snapshot[0].id, "y");
        sub.release().await;
    }

    #[tokio::test]
    async fn released_subscription_stays_silent() {
        let sync = InProcessRoomSync::new(Arc::new(RoomHub::new()));
        let (callback, mut rx) = channel_callback();
        let sub = sync.subscribe("r", callback).await;
        next(&mut rx).await;

        sub.release().await;
        sync.upsert("r", &asset("a", "A", 1)).await.unwrap();

        // The callback (and its sender) are dropped with the finished task.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn missing_delete_succeeds() {
        let sync = InProcessRoomSync::new(Arc::new(RoomHub::new()));
        assert!(sync.delete("r", "nothing").await.is_ok());
    }
}
