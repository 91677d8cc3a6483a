#[cfg(feature = "file-store")]
pub mod file;
pub mod memory;

use crate::dao::storage::StorageResult;

#[cfg(feature = "file-store")]
pub use file::FileStore;
pub use memory::MemoryStore;

/// Keyed text storage backing every persisted collection.
///
/// Calls are synchronous: the store stands in for a per-browser local storage
/// area, so there is a single writer and no transactions.
pub trait KeyValueStore: Send + Sync {
    /// Raw value stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String) -> StorageResult<()>;
    /// Drop `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
