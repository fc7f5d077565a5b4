//! # Cart Persistence
//!
//! Reads and writes the cart record under a single key as a JSON array of
//! line items. Every failure here is logged and swallowed: a broken store
//! must never take the cart down with it.

use tracing::{debug, warn};
use vitrine_core::LineItem;

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

/// Key the cart record is stored under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "cart";

pub struct CartPersistence {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl CartPersistence {
    pub fn new(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        CartPersistence {
            store,
            key: key.into(),
        }
    }

    /// Persistence under [`DEFAULT_CART_KEY`].
    pub fn with_default_key(store: Box<dyn KeyValueStore>) -> Self {
        Self::new(store, DEFAULT_CART_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the persisted lines.
    ///
    /// Returns `None` when nothing is stored, the store fails, or the record
    /// is not a valid line array.
    pub fn load(&self) -> Option<Vec<LineItem>> {
        match self.persisted_items() {
            Ok(items) => items,
            Err(e) => {
                warn!(key = %self.key, error = %e, "ignoring unreadable cart record");
                None
            }
        }
    }

    /// Writes `items`, replacing any previous record.
    pub fn save(&self, items: &[LineItem]) {
        let result = serde_json::to_string(items)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(&self.key, &json));

        match result {
            Ok(()) => debug!(key = %self.key, lines = items.len(), "cart saved"),
            Err(e) => warn!(key = %self.key, error = %e, "failed to save cart"),
        }
    }

    /// Deletes the record entirely.
    pub fn remove(&self) {
        match self.store.remove(&self.key) {
            Ok(()) => debug!(key = %self.key, "cart record removed"),
            Err(e) => warn!(key = %self.key, error = %e, "failed to remove cart record"),
        }
    }

    /// The stored record, with errors surfaced instead of swallowed.
    pub fn persisted_items(&self) -> StoreResult<Option<Vec<LineItem>>> {
        match self.store.get(&self.key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for CartPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartPersistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use vitrine_core::Product;

    fn line(id: &str, qty: i64) -> LineItem {
        LineItem::new(Product::new(id, id, 500), qty, None, None)
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let persistence = CartPersistence::with_default_key(Box::new(store.clone()));

        assert_eq!(persistence.load(), None);

        let items = vec![line("mug", 2), line("cap", 1)];
        persistence.save(&items);

        assert_eq!(persistence.load(), Some(items));
        assert!(store.get("cart").unwrap().is_some());
    }

    #[test]
    fn test_record_uses_storefront_field_names() {
        let store = MemoryStore::new();
        let persistence = CartPersistence::new(Box::new(store.clone()), "shop-cart");

        let mut item = line("shirt", 1);
        item.selected_size = Some("M".into());
        persistence.save(&[item]);

        let json = store.get("shop-cart").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert!(first.get("product").is_some());
        assert_eq!(first["quantity"], 1);
        assert_eq!(first["selectedSize"], "M");
        assert!(first.get("selectedVariants").is_some());
    }

    #[test]
    fn test_corrupt_record_loads_as_none() {
        let store = MemoryStore::new();
        store.set("cart", "{not json").unwrap();

        let persistence = CartPersistence::with_default_key(Box::new(store));
        assert_eq!(persistence.load(), None);
        assert!(matches!(
            persistence.persisted_items(),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_remove_deletes_record() {
        let store = MemoryStore::new();
        let persistence = CartPersistence::with_default_key(Box::new(store.clone()));

        persistence.save(&[line("mug", 1)]);
        persistence.remove();

        assert_eq!(store.get("cart").unwrap(), None);
        assert_eq!(persistence.persisted_items().unwrap(), None);
    }

    #[test]
    fn test_invalid_key_is_swallowed_on_save() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = crate::kv::FileStore::new(tmp.path());
        let persistence = CartPersistence::new(Box::new(store), "../cart");

        persistence.save(&[line("mug", 1)]);
        assert_eq!(persistence.load(), None);
    }
}
