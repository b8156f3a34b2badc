//! Room change feed.
//!
//! This crate is the server side of the shared room store:
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`RoomChange`]: one sequenced upsert or delete in a room.
//! - [`RoomHub`]: per-room document maps, last-write-wins per record,
//!   publishing every applied change on the bus.
//! - [`ChangeJournal`]: background service that appends every change to a
//!   JSON-lines file, and replays it on startup.

pub mod bus;
pub mod hub;
pub mod persistence;

pub use bus::{ChangeKind, EventBus, RoomChange};
pub use hub::RoomHub;
pub use persistence::{ChangeJournal, JournalError};
