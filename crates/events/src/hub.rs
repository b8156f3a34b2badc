//! Shared room documents with a sequenced change feed.
//!
//! [`RoomHub`] is the single writer for every room it hosts. Each accepted
//! mutation gets the next hub-wide sequence number and is applied
//! last-write-wins per document, then published on the [`EventBus`] while
//! the state lock is still held, so subscribers observe changes in sequence
//! order.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use assetroom_core::asset::{sort_newest_first, Asset};
use assetroom_core::error::CoreError;
use assetroom_core::room::normalize_room_id;
use tokio::sync::broadcast;

use crate::bus::{ChangeKind, EventBus, RoomChange};

type Fields = serde_json::Map<String, serde_json::Value>;

/// A stored document and the sequence of the last change applied to it.
#[derive(Debug, Clone)]
struct Document {
    fields: Fields,
    last_seq: u64,
}

#[derive(Default)]
struct HubState {
    next_seq: u64,
    rooms: HashMap<String, BTreeMap<String, Document>>,
}

impl HubState {
    fn take_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Apply a change if it is newer than what the document already holds.
    fn apply(&mut self, change: &RoomChange) -> bool {
        self.next_seq = self.next_seq.max(change.seq);
        let docs = self.rooms.entry(change.room.clone()).or_default();

        if let Some(existing) = docs.get(&change.asset_id) {
            if existing.last_seq >= change.seq {
                return false;
            }
        }

        match &change.kind {
            ChangeKind::Upsert { fields } => {
                let doc = docs.entry(change.asset_id.clone()).or_insert_with(|| Document {
                    fields: Fields::new(),
                    last_seq: 0,
                });
                merge_fields(&mut doc.fields, fields);
                doc.last_seq = change.seq;
                true
            }
            ChangeKind::Delete => docs.remove(&change.asset_id).is_some(),
        }
    }

    /// The document `asset_id` would hold after merging `fields`.
    fn merged(&self, room: &str, asset_id: &str, fields: &Fields) -> Fields {
        let mut doc = self
            .rooms
            .get(room)
            .and_then(|docs| docs.get(asset_id))
            .map(|doc| doc.fields.clone())
            .unwrap_or_default();
        merge_fields(&mut doc, fields);
        doc
    }

    fn snapshot(&self, room: &str) -> Vec<Asset> {
        let Some(docs) = self.rooms.get(room) else {
            return Vec::new();
        };

        let mut assets: Vec<Asset> = docs
            .iter()
            .filter_map(|(id, doc)| match Asset::from_document(id, &doc.fields) {
                Ok(asset) => Some(asset),
                Err(e) => {
                    tracing::warn!(room, asset_id = %id, error = %e, "Skipping undecodable document");
                    None
                }
            })
            .collect();
        sort_newest_first(&mut assets);
        assets
    }
}

/// Copy every key except `id` from `fields` into `doc`.
fn merge_fields(doc: &mut Fields, fields: &Fields) {
    for (key, value) in fields {
        if key != "id" {
            doc.insert(key.clone(), value.clone());
        }
    }
}

/// In-process room store with last-write-wins documents and a change feed.
pub struct RoomHub {
    state: Mutex<HubState>,
    bus: EventBus,
}

impl RoomHub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HubState::default()),
            bus: EventBus::default(),
        }
    }

    /// Rebuild a hub from previously journaled changes.
    ///
    /// Changes are applied in the order given; nothing is published.
    pub fn from_changes(changes: impl IntoIterator<Item = RoomChange>) -> Self {
        let hub = Self::new();
        {
            let mut state = hub.lock();
            let mut applied = 0usize;
            for change in changes {
                state.apply(&change);
                applied += 1;
            }
            tracing::info!(applied, next_seq = state.next_seq, "Room hub restored");
        }
        hub
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        // A panic while holding the lock cannot leave a document half-merged
        // in a way later writes cannot overwrite.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Merge `fields` into document `asset_id` of `room`.
    ///
    /// Fields not present in `fields` keep their stored values. An `id` key
    /// inside `fields` is ignored. Returns the resulting record. A merge that
    /// would not decode as an asset is rejected and changes nothing.
    pub fn upsert(&self, room: &str, asset_id: &str, fields: Fields) -> Result<Asset, CoreError> {
        let asset_id = asset_id.trim();
        if asset_id.is_empty() {
            return Err(CoreError::Validation("Asset id must not be empty".into()));
        }
        let room = normalize_room_id(room);

        let mut state = self.lock();
        let merged = state.merged(&room, asset_id, &fields);
        let asset = Asset::from_document(asset_id, &merged)
            .map_err(|e| CoreError::Validation(format!("Document is not a valid asset: {e}")))?;

        let seq = state.take_seq();
        let change = RoomChange::new(seq, room.clone(), asset_id, ChangeKind::Upsert { fields });
        state.apply(&change);
        self.bus.publish(change);
        tracing::debug!(room = %room, asset_id, seq, "Asset upserted");
        Ok(asset)
    }

    /// Remove document `asset_id` from `room`.
    ///
    /// Returns whether a document existed. Deleting a missing document is
    /// not an error and publishes nothing.
    pub fn delete(&self, room: &str, asset_id: &str) -> bool {
        let room = normalize_room_id(room);
        let mut state = self.lock();

        let exists = state
            .rooms
            .get(&room)
            .is_some_and(|docs| docs.contains_key(asset_id));
        if !exists {
            return false;
        }

        let seq = state.take_seq();
        let change = RoomChange::new(seq, room.clone(), asset_id, ChangeKind::Delete);
        state.apply(&change);
        self.bus.publish(change);
        tracing::debug!(room = %room, asset_id, seq, "Asset deleted");
        true
    }

    /// The room's documents as assets, newest first.
    pub fn snapshot(&self, room: &str) -> Vec<Asset> {
        self.lock().snapshot(&normalize_room_id(room))
    }

    /// Atomically take a snapshot of `room` and subscribe to later changes.
    ///
    /// No change can fall between the snapshot and the first message on the
    /// returned receiver.
    pub fn watch(&self, room: &str) -> (Vec<Asset>, broadcast::Receiver<RoomChange>) {
        let state = self.lock();
        let rx = self.bus.subscribe();
        (state.snapshot(&normalize_room_id(room)), rx)
    }

    /// Subscribe to every change in every room.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomChange> {
        self.bus.subscribe()
    }

    /// Number of rooms that have ever held a document.
    pub fn room_count(&self) -> usize {
        self.lock().rooms.len()
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
