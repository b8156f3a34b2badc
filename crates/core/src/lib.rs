//! AssetRoom domain core.
//!
//! Zero internal dependencies: the asset model, draft validation, room id
//! normalization, search and clipboard formatting, and the room wire
//! protocol shared by the client, the sync layer and the room server.

pub mod asset;
pub mod error;
pub mod export;
pub mod protocol;
pub mod room;
pub mod search;
pub mod types;
