//! # Cart State Manager
//!
//! [`CartStore`] owns the live cart. It applies the rules from
//! `vitrine_core::Cart`, persists after every committed change and pushes a
//! [`CartSnapshot`] to every subscriber.
//!
//! ## Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Normal ──── set_direct_purchase_item ────► DirectPurchase(line)       │
//! │     ▲                                             │                     │
//! │     └──── clear_direct_purchase / clear_cart ─────┘                     │
//! │                                                                         │
//! │   Normal:          reads see the cart, mutators work                    │
//! │   DirectPurchase:  reads see only the direct line, cart mutators are    │
//! │                    no-ops, the cart itself is left untouched            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The direct-purchase line is never persisted.

use std::fmt;
use std::slice;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;
use vitrine_core::cart::{item_count, total_amount};
use vitrine_core::{
    Cart, DirectPurchase, LineItem, Money, PriceResolver, Product, StandardPricing,
    VariantSelection,
};

use crate::persistence::CartPersistence;

// =============================================================================
// Snapshot
// =============================================================================

/// Owned view of the active item set, handed to subscribers and the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub item_count: i64,
    pub total_amount_cents: i64,
    pub direct_purchase_item: Option<LineItem>,
    #[ts(as = "String")]
    pub taken_at: DateTime<Utc>,
}

// =============================================================================
// Mode
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CartMode {
    Normal,
    /// A "buy now" line overrides the cart.
    DirectPurchase(LineItem),
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type Listener = Box<dyn FnMut(&CartSnapshot)>;

// =============================================================================
// Cart Store
// =============================================================================

pub struct CartStore {
    cart: Cart,
    mode: CartMode,
    pricing: Box<dyn PriceResolver>,
    persistence: CartPersistence,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl CartStore {
    /// Opens the store with [`StandardPricing`], restoring whatever
    /// `persistence` holds. A missing or unreadable record starts empty.
    pub fn new(persistence: CartPersistence) -> Self {
        Self::with_pricing(persistence, StandardPricing)
    }

    pub fn with_pricing(
        persistence: CartPersistence,
        pricing: impl PriceResolver + 'static,
    ) -> Self {
        let items = persistence.load().unwrap_or_default();
        info!(key = persistence.key(), lines = items.len(), "cart restored");

        CartStore {
            cart: Cart::from_items(items),
            mode: CartMode::Normal,
            pricing: Box::new(pricing),
            persistence,
            listeners: Vec::new(),
        }
    }

    // =========================================================================
    // Cart Mutators
    // =========================================================================

    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        selected_variants: Option<VariantSelection>,
        selected_size: Option<String>,
    ) {
        debug!(product_id = %product.id, quantity, ?selected_size, "add_item");
        self.mutate("add_item", |cart| {
            cart.add_item(product, quantity, selected_variants, selected_size)
        });
    }

    pub fn remove_item(&mut self, product_id: &str) {
        debug!(product_id, "remove_item");
        self.mutate("remove_item", |cart| cart.remove_item(product_id));
    }

    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        debug!(product_id, quantity, "update_quantity");
        self.mutate("update_quantity", |cart| {
            cart.update_quantity(product_id, quantity)
        });
    }

    pub fn update_item_size(&mut self, product_id: &str, selected_size: &str) {
        debug!(product_id, selected_size, "update_item_size");
        self.mutate("update_item_size", |cart| {
            cart.update_item_size(product_id, selected_size)
        });
    }

    pub fn replace_item(
        &mut self,
        old_product_id: &str,
        new_product: &Product,
        quantity: i64,
        selected_variants: Option<VariantSelection>,
        selected_size: Option<String>,
    ) {
        debug!(old_product_id, new_product_id = %new_product.id, quantity, "replace_item");
        self.mutate("replace_item", |cart| {
            cart.replace_item(
                old_product_id,
                new_product,
                quantity,
                selected_variants,
                selected_size,
            )
        });
    }

    /// Empties the cart, drops any direct purchase and deletes the persisted
    /// record.
    pub fn clear_cart(&mut self) {
        debug!(lines = self.cart.line_count(), "clear_cart");
        self.cart.clear();
        self.mode = CartMode::Normal;
        self.persistence.remove();
        self.notify();
    }

    // =========================================================================
    // Direct Purchase
    // =========================================================================

    /// Puts the store in direct-purchase mode with `purchase` as the only
    /// visible line. Replaces any previous direct purchase.
    pub fn set_direct_purchase_item(&mut self, purchase: DirectPurchase) {
        let line = purchase.into_line_item();
        debug!(product_id = %line.product.id, quantity = line.quantity, "set_direct_purchase_item");
        self.mode = CartMode::DirectPurchase(line);
        self.notify();
    }

    /// Leaves direct-purchase mode. The cart is as it was before.
    pub fn clear_direct_purchase(&mut self) {
        debug!(was_direct = self.is_direct_purchase(), "clear_direct_purchase");
        self.mode = CartMode::Normal;
        self.notify();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The active item set: the direct-purchase line if one is set,
    /// otherwise the cart.
    pub fn items(&self) -> &[LineItem] {
        match &self.mode {
            CartMode::DirectPurchase(line) => slice::from_ref(line),
            CartMode::Normal => self.cart.items(),
        }
    }

    /// The underlying cart, ignoring any direct purchase.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn mode(&self) -> &CartMode {
        &self.mode
    }

    pub fn direct_purchase_item(&self) -> Option<&LineItem> {
        match &self.mode {
            CartMode::DirectPurchase(line) => Some(line),
            CartMode::Normal => None,
        }
    }

    pub fn is_direct_purchase(&self) -> bool {
        matches!(self.mode, CartMode::DirectPurchase(_))
    }

    pub fn item_count(&self) -> i64 {
        item_count(self.items())
    }

    pub fn total_amount(&self) -> Money {
        total_amount(self.items(), self.pricing.as_ref())
    }

    pub fn line_count(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn persistence(&self) -> &CartPersistence {
        &self.persistence
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items().to_vec(),
            item_count: self.item_count(),
            total_amount_cents: self.total_amount().cents(),
            direct_purchase_item: self.direct_purchase_item().cloned(),
            taken_at: Utc::now(),
        }
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers `listener` to receive a snapshot after every change.
    ///
    /// Listeners run synchronously inside the mutating call.
    pub fn subscribe(&mut self, listener: impl FnMut(&CartSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.listeners.push((id, Box::new(listener)));
        debug!(subscription = %id, listeners = self.listeners.len(), "subscribed");
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        before != self.listeners.len()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn mutate(&mut self, operation: &str, apply: impl FnOnce(&mut Cart)) {
        if self.is_direct_purchase() {
            debug!(operation, "ignored while a direct purchase is active");
            return;
        }

        apply(&mut self.cart);
        self.persistence.save(self.cart.items());
        self.notify();
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }

        let snapshot = self.snapshot();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&snapshot);
        }
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("mode", &self.mode)
            .field("persistence", &self.persistence)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{KeyValueStore, MemoryStore};
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;
    use vitrine_core::{FeeRate, LineKey};

    fn product(id: &str, price_cents: i64) -> Product {
        Product::new(id, id, price_cents)
    }

    fn sized(id: &str, price_cents: i64) -> Product {
        let mut p = Product::new(id, id, price_cents);
        p.sizes = Some(vec!["S".into(), "M".into(), "L".into()]);
        p
    }

    fn in_category(id: &str, category: &str) -> Product {
        let mut p = Product::new(id, id, 1000);
        p.category_ids = Some(vec![category.into()]);
        p
    }

    fn open(store: &MemoryStore) -> CartStore {
        CartStore::new(CartPersistence::with_default_key(Box::new(store.clone())))
    }

    fn stored_lines(store: &MemoryStore) -> Option<Vec<LineItem>> {
        store
            .get("cart")
            .unwrap()
            .map(|json| serde_json::from_str(&json).unwrap())
    }

    #[test]
    fn test_starts_empty_without_record() {
        let cart = open(&MemoryStore::new());

        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total_amount(), Money::zero());
        assert!(!cart.is_direct_purchase());
    }

    #[test]
    fn test_restores_persisted_lines() {
        let store = MemoryStore::new();
        {
            let mut cart = open(&store);
            cart.add_item(&product("mug", 1200), 2, None, None);
        }

        let cart = open(&store);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_corrupt_record_starts_empty() {
        let store = MemoryStore::new();
        store.set("cart", "[{\"broken\":").unwrap();

        let cart = open(&store);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_every_mutation_persists() {
        let store = MemoryStore::new();
        let mut cart = open(&store);
        let mug = product("mug", 1200);

        cart.add_item(&mug, 2, None, None);
        cart.add_item(&mug, 3, None, None);
        let lines = stored_lines(&store).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);

        cart.update_quantity("mug", 7);
        assert_eq!(stored_lines(&store).unwrap()[0].quantity, 7);

        cart.remove_item("mug");
        assert_eq!(stored_lines(&store), Some(vec![]));
    }

    #[test]
    fn test_remove_item_is_idempotent() {
        let store = MemoryStore::new();
        let mut cart = open(&store);
        cart.add_item(&product("mug", 1200), 1, None, None);
        cart.add_item(&product("cap", 800), 1, None, None);

        cart.remove_item("mug");
        let once = cart.items().to_vec();
        cart.remove_item("mug");

        assert_eq!(cart.items(), once.as_slice());
        assert_eq!(stored_lines(&store).unwrap(), once);
    }

    #[test]
    fn test_sizes_are_separate_lines() {
        let mut cart = open(&MemoryStore::new());
        let shirt = sized("shirt", 2500);

        cart.add_item(&shirt, 1, None, Some("M".into()));
        cart.add_item(&shirt, 1, None, Some("L".into()));

        assert_eq!(cart.line_count(), 2);

        cart.update_quantity("shirt", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_replace_same_category_keeps_quantity() {
        let mut cart = open(&MemoryStore::new());
        cart.add_item(&in_category("tee-red", "tees"), 3, None, None);

        cart.replace_item("tee-red", &in_category("tee-blue", "tees"), 1, None, None);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].product.id, "tee-blue");
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_replace_cross_category_uses_requested_quantity() {
        let mut cart = open(&MemoryStore::new());
        cart.add_item(&in_category("tee", "tees"), 3, None, None);

        cart.replace_item("tee", &in_category("mug", "kitchen"), 2, None, None);

        assert_eq!(cart.items()[0].product.id, "mug");
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_update_item_size_merges_through_store() {
        let store = MemoryStore::new();
        let mut cart = open(&store);
        let shirt = sized("shirt", 2500);
        cart.add_item(&shirt, 1, None, Some("S".into()));
        cart.add_item(&shirt, 2, None, Some("M".into()));

        cart.update_item_size("shirt", "M");

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(stored_lines(&store).unwrap()[0].quantity, 3);
    }

    #[test]
    fn test_direct_purchase_overrides_reads() {
        let mut cart = open(&MemoryStore::new());
        cart.add_item(&product("mug", 1200), 4, None, None);

        cart.set_direct_purchase_item(DirectPurchase::new(product("lamp", 4000), 2));

        assert!(cart.is_direct_purchase());
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].product.id, "lamp");
        assert_eq!(cart.total_amount(), Money::from_cents(8000));
        assert_eq!(cart.cart().item_count(), 4);
    }

    #[test]
    fn test_mutators_are_noops_during_direct_purchase() {
        let store = MemoryStore::new();
        let mut cart = open(&store);
        cart.add_item(&product("mug", 1200), 1, None, None);
        cart.add_item(&sized("shirt", 2500), 2, None, Some("S".into()));
        let before = stored_lines(&store);

        cart.set_direct_purchase_item(DirectPurchase::new(product("lamp", 4000), 1));
        cart.add_item(&product("cap", 800), 5, None, None);
        cart.remove_item("mug");
        cart.update_quantity("mug", 9);
        cart.update_item_size("shirt", "M");
        cart.replace_item("mug", &product("cap", 800), 1, None, None);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(stored_lines(&store), before);

        cart.clear_direct_purchase();
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.items()[0].product.id, "mug");
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.items()[1].selected_size.as_deref(), Some("S"));
        assert_eq!(cart.items()[1].quantity, 2);
    }

    #[test]
    fn test_direct_purchase_is_not_persisted() {
        let store = MemoryStore::new();
        let mut cart = open(&store);

        cart.set_direct_purchase_item(DirectPurchase::new(product("lamp", 4000), 1));

        assert_eq!(stored_lines(&store), None);
        assert!(!open(&store).is_direct_purchase());
    }

    #[test]
    fn test_direct_purchase_variant_replaces_size() {
        let mut cart = open(&MemoryStore::new());

        cart.set_direct_purchase_item(
            DirectPurchase::new(sized("shirt", 2500), 1)
                .with_size("M")
                .with_variant("v-42"),
        );

        let line = cart.direct_purchase_item().unwrap();
        assert_eq!(line.selected_size, None);
        assert_eq!(
            line.selected_variants
                .as_ref()
                .and_then(|v| v.get("variant"))
                .map(String::as_str),
            Some("v-42")
        );

        cart.set_direct_purchase_item(DirectPurchase::new(sized("shirt", 2500), 3).with_size("L"));
        let line = cart.direct_purchase_item().unwrap();
        assert_eq!(line.selected_size.as_deref(), Some("L"));
        assert_eq!(line.selected_variants, None);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_clear_cart_removes_record_and_direct_purchase() {
        let store = MemoryStore::new();
        let mut cart = open(&store);
        cart.add_item(&product("mug", 1200), 1, None, None);
        cart.set_direct_purchase_item(DirectPurchase::new(product("lamp", 4000), 1));

        cart.clear_cart();

        assert!(cart.is_empty());
        assert!(!cart.is_direct_purchase());
        assert_eq!(store.get("cart").unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_total_amount_with_inclusive_and_exclusive_fees() {
        let mut cart = open(&MemoryStore::new());

        let mut inclusive = product("mug", 1000);
        inclusive.fee_included = true;
        inclusive.fee_rate_bps = 1000;

        let mut exclusive = product("cap", 2000);
        exclusive.fee_included = false;
        exclusive.fee_rate_bps = 1000;

        cart.add_item(&inclusive, 2, None, None);
        cart.add_item(&exclusive, 3, None, None);

        // 1000*2 + 2200*3
        assert_eq!(cart.total_amount(), Money::from_cents(8600));
    }

    #[test]
    fn test_custom_pricing_resolver() {
        let flat = |base: Money, _incl: bool, _rate: FeeRate| base + Money::from_cents(100);
        let mut cart = CartStore::with_pricing(
            CartPersistence::with_default_key(Box::new(MemoryStore::new())),
            flat,
        );

        cart.add_item(&product("mug", 1000), 2, None, None);
        assert_eq!(cart.total_amount(), Money::from_cents(2200));
        assert_eq!(cart.snapshot().total_amount_cents, 2200);
    }

    #[test]
    fn test_subscribers_receive_snapshots() {
        let mut cart = open(&MemoryStore::new());
        let seen: Rc<RefCell<Vec<i64>>> = Rc::default();

        let sink = Rc::clone(&seen);
        let id = cart.subscribe(move |snap| sink.borrow_mut().push(snap.item_count));

        cart.add_item(&product("mug", 1200), 2, None, None);
        cart.set_direct_purchase_item(DirectPurchase::new(product("lamp", 4000), 5));
        cart.add_item(&product("mug", 1200), 1, None, None); // ignored, no event
        cart.clear_direct_purchase();
        cart.clear_cart();

        assert_eq!(*seen.borrow(), vec![2, 5, 2, 0]);

        assert!(cart.unsubscribe(id));
        assert!(!cart.unsubscribe(id));
        cart.add_item(&product("mug", 1200), 1, None, None);
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let mut cart = open(&MemoryStore::new());
        cart.add_item(&product("mug", 1200), 1, None, None);

        let value = serde_json::to_value(cart.snapshot()).unwrap();
        assert_eq!(value["itemCount"], 1);
        assert_eq!(value["totalAmountCents"], 1200);
        assert!(value["directPurchaseItem"].is_null());
        assert!(value.get("takenAt").is_some());
    }

    #[test]
    fn test_keys_unique_after_mixed_operations() {
        let mut cart = open(&MemoryStore::new());
        let shirt = sized("shirt", 2500);
        let mug = in_category("mug", "kitchen");
        let bowl = in_category("bowl", "kitchen");

        cart.add_item(&shirt, 1, None, Some("S".into()));
        cart.add_item(&shirt, 2, None, Some("M".into()));
        cart.add_item(&mug, 1, None, None);
        cart.update_item_size("shirt", "L");
        cart.add_item(&shirt, 1, None, Some("L".into()));
        cart.replace_item("mug", &bowl, 4, None, None);
        cart.add_item(&mug, 2, None, None);
        cart.replace_item("bowl", &mug, 1, None, None);

        let keys: HashSet<LineKey> = cart.items().iter().map(LineItem::key).collect();
        assert_eq!(keys.len(), cart.line_count());
        assert!(cart.cart().has_unique_keys());
    }
}
