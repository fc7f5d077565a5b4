//! # Key-Value Storage
//!
//! The seam between the cart and wherever its record lives. In a browser
//! this is local storage; natively it is a directory of JSON files; in tests
//! it is a shared in-memory map.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  KeyValueStore (trait)                                                  │
//! │    get(key)        -> Option<String>                                    │
//! │    set(key, value)                                                      │
//! │    remove(key)                                                          │
//! │                                                                         │
//! │  ├── MemoryStore   Arc<Mutex<HashMap>>, Clone shares the map            │
//! │  └── FileStore     <data_dir>/<key>.json                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::{StoreError, StoreResult};

/// String key-value storage.
///
/// Removing an absent key is not an error.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Rejects keys that are empty or could escape a backend's namespace
/// (path separators, `..`). Allowed: ASCII letters, digits, `-`, `_`, `.`.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.contains("..")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
