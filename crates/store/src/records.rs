//! The asset collection and room identity on top of a [`KeyValueStore`].
//!
//! The whole collection lives under one key as a single JSON array; every
//! save rewrites it. The last-used room id lives under its own key.

use std::sync::Arc;

use assetroom_core::asset::Asset;

use crate::{KeyValueStore, StoreError};

/// Key holding the serialized asset collection.
pub const ASSETS_KEY: &str = "assetroom_local_assets_v1";

/// Key holding the last-used room id.
pub const ROOM_KEY: &str = "assetroom_room_id";

/// Local persistence for offline mode.
#[derive(Clone)]
pub struct LocalRecordStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalRecordStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the stored collection.
    ///
    /// Missing data yields an empty collection. Unreadable or corrupt data is
    /// logged and also yields an empty collection; it never fails the caller.
    pub fn load_assets(&self) -> Vec<Asset> {
        match self.try_load_assets() {
            Ok(assets) => assets,
            Err(e) => {
                tracing::error!(error = %e, key = ASSETS_KEY, "Failed to load local assets");
                Vec::new()
            }
        }
    }

    fn try_load_assets(&self) -> Result<Vec<Asset>, StoreError> {
        let Some(blob) = self.kv.get(ASSETS_KEY)? else {
            return Ok(Vec::new());
        };
        let rows: Vec<serde_json::Value> = serde_json::from_str(&blob)?;

        let mut assets = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<Asset>(row) {
                Ok(asset) if !asset.id.trim().is_empty() => assets.push(asset),
                Ok(_) => tracing::warn!(index, "Dropping local asset with a blank id"),
                Err(e) => tracing::warn!(index, error = %e, "Dropping undecodable local asset"),
            }
        }
        Ok(assets)
    }

    /// Replace the stored collection with `assets`.
    pub fn save_assets(&self, assets: &[Asset]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(assets)?;
        self.kv.set(ASSETS_KEY, &blob)?;
        tracing::debug!(count = assets.len(), "Local assets saved");
        Ok(())
    }

    /// The last-used room id, if any. Read failures are logged and treated as
    /// "no room".
    pub fn load_room(&self) -> Option<String> {
        match self.kv.get(ROOM_KEY) {
            Ok(room) => room.filter(|r| !r.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, key = ROOM_KEY, "Failed to read room id");
                None
            }
        }
    }

    pub fn save_room(&self, room: &str) -> Result<(), StoreError> {
        self.kv.set(ROOM_KEY, room)
    }

    pub fn clear_room(&self) -> Result<(), StoreError> {
        self.kv.remove(ROOM_KEY)
    }
}
