//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the fan-out point for [`RoomChange`]s. It is designed to
//! be shared via `Arc` (usually inside a [`RoomHub`](crate::RoomHub)).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// RoomChange
// ---------------------------------------------------------------------------

/// What happened to a single document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ChangeKind {
    /// Merge `fields` into the document, creating it if needed.
    Upsert {
        fields: serde_json::Map<String, serde_json::Value>,
    },
    /// Remove the document.
    Delete,
}

/// A sequenced mutation of one document in one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomChange {
    /// Hub-wide, strictly increasing sequence number.
    pub seq: u64,

    /// Normalized room id.
    pub room: String,

    /// Document key (the asset id).
    pub asset_id: String,

    #[serde(flatten)]
    pub kind: ChangeKind,

    /// When the hub applied the change (UTC).
    pub timestamp: DateTime<Utc>,
}

impl RoomChange {
    pub fn new(seq: u64, room: impl Into<String>, asset_id: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            seq,
            room: room.into(),
            asset_id: asset_id.into(),
            kind,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`RoomChange`].
///
/// # Usage
///
/// ```rust
/// use assetroom_events::bus::{ChangeKind, EventBus, RoomChange};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(RoomChange::new(1, "team-x", "a-1", ChangeKind::Delete));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RoomChange>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change to all current subscribers.
    ///
    /// If there are no active subscribers the change is silently dropped.
    pub fn publish(&self, change: RoomChange) {
        // A send error only means there are zero receivers.
        let _ = self.sender.send(change);
    }

    /// Subscribe to all changes published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomChange> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let mut fields = serde_json::Map::new();
        fields.insert("name".into(), serde_json::json!("Widget"));
        bus.publish(RoomChange::new(7, "team-x", "a-1", ChangeKind::Upsert { fields }));

        let received = rx.recv().await.expect("should receive the change");
        assert_eq!(received.seq, 7);
        assert_eq!(received.room, "team-x");
        assert_eq!(received.asset_id, "a-1");
        match received.kind {
            ChangeKind::Upsert { fields } => assert_eq!(fields["name"], "Widget"),
            ChangeKind::Delete => panic!("expected an upsert"),
        }
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_change() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(RoomChange::new(1, "r", "x", ChangeKind::Delete));

        let c1 = rx1.recv().await.expect("subscriber 1 should receive");
        let c2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(c1.seq, 1);
        assert_eq!(c2.seq, 1);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(RoomChange::new(1, "r", "x", ChangeKind::Delete));
    }

    #[test]
    fn change_serializes_flat_with_op_tag() {
        let change = RoomChange::new(3, "r", "x", ChangeKind::Delete);
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["op"], "delete");
        assert_eq!(json["seq"], 3);
        assert_eq!(json["asset_id"], "x");

        let back: RoomChange = serde_json::from_value(json).unwrap();
        assert_eq!(back, change);
    }
}
