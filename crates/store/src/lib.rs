//! Durable local storage for the offline mode.
//!
//! - [`KeyValueStore`]: string key/value storage, the analog of a
//!   browser's local storage.
//! - [`FileKeyValueStore`] / [`MemoryKeyValueStore`]: on-disk and in-memory
//!   backends.
//! - [`LocalRecordStore`]: the asset collection and last-used room id on top
//!   of any backend.

mod error;
mod file;
mod memory;
pub mod records;

pub use error::StoreError;
pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use records::LocalRecordStore;

/// Minimal synchronous key/value storage.
///
/// Values are whole strings; a `set` replaces the previous value entirely.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
