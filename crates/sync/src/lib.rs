//! Room synchronization client.
//!
//! [`RoomSync`] is the seam between the application controller and a shared
//! room store. Two backends are provided:
//!
//! - [`InProcessRoomSync`] talks to a [`RoomHub`](assetroom_events::RoomHub)
//!   living in the same process.
//! - [`RemoteRoomSync`] talks to a room server over HTTP and a WebSocket
//!   snapshot stream, reconnecting with exponential backoff.
//!
//! Both deliver whole-collection snapshots: one immediately after
//! subscribing (even for an empty room) and one after every change.

use std::sync::Arc;

use assetroom_core::asset::Asset;
use async_trait::async_trait;

pub mod error;
pub mod in_process;
pub mod reconnect;
pub mod remote;
pub mod subscription;

pub use error::SyncError;
pub use in_process::InProcessRoomSync;
pub use remote::RemoteRoomSync;
pub use subscription::Subscription;

/// Receives every snapshot of a subscribed room, newest record first.
pub type SnapshotCallback = Arc<dyn Fn(Vec<Asset>) + Send + Sync>;

/// Access to shared rooms.
///
/// Room ids are normalized by the implementation; callers pass them as the
/// user typed them.
#[async_trait]
pub trait RoomSync: Send + Sync {
    /// Start delivering snapshots of `room` to `on_change`.
    ///
    /// Stream failures are logged and never surface to the caller.
    async fn subscribe(&self, room: &str, on_change: SnapshotCallback) -> Subscription;

    /// Merge-write `asset` (minus its id) into document `asset.id`.
    async fn upsert(&self, room: &str, asset: &Asset) -> Result<(), SyncError>;

    /// Delete document `asset_id`. Deleting a missing document succeeds.
    async fn delete(&self, room: &str, asset_id: &str) -> Result<(), SyncError>;
}
