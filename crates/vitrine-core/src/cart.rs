//! # Cart Rules
//!
//! The reconciliation rules for cart lines: how additions merge, how size
//! changes collapse lines, and how a replacement carries quantity over.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation          Matches lines by          Effect                    │
//! │  ─────────          ────────────────          ──────                    │
//! │  add_item           LineKey (id [+ size])     qty += n, or append       │
//! │  remove_item        product id                drop all sizes            │
//! │  update_quantity    product id                qty = n, n <= 0 removes   │
//! │  update_item_size   product id                resize, merge collisions  │
//! │  replace_item       product id (old),         swap, category-aware qty  │
//! │                     LineKey (new)                                       │
//! │  clear              -                         empty                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariant
//! After every operation no two lines share a [`LineKey`]. Operations are
//! total: they never fail, unknown ids are simply a no-op.
//!
//! This type knows nothing about persistence or the direct-purchase
//! override; `vitrine-store` layers those on top.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::money::Money;
use crate::pricing::PriceResolver;
use crate::types::{LineItem, Product, VariantSelection};
use crate::DEFAULT_QUANTITY;

/// Ordered cart lines (insertion order is display order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Wraps previously persisted lines.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        Cart { items }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Adds `quantity` units of `product` or merges into the matching line.
    ///
    /// A line matches when it has the same product id and, for sized
    /// products, the same selected size. On a merge the existing line keeps
    /// its variants and size; only the quantity grows. The quantity is not
    /// validated here.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: i64,
        selected_variants: Option<VariantSelection>,
        selected_size: Option<String>,
    ) {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.matches(product, selected_size.as_deref()))
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(LineItem::new(
            product.clone(),
            quantity,
            selected_variants,
            selected_size,
        ));
    }

    /// Removes every line for `product_id`, whatever its size.
    pub fn remove_item(&mut self, product_id: &str) {
        self.items.retain(|line| line.product.id != product_id);
    }

    /// Overwrites the quantity of every line for `product_id`.
    ///
    /// `quantity <= 0` removes all of them instead.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }

        for line in self.items.iter_mut().filter(|l| l.product.id == product_id) {
            line.quantity = quantity;
        }
    }

    /// Moves every line for `product_id` to `selected_size`.
    ///
    /// Each line is compared against the cart as it was *before* the call.
    /// If another line already sits at the target size, this line becomes a
    /// copy of that one with both quantities added; otherwise only its size
    /// changes. The result is then deduplicated on (product id, size),
    /// keeping the first occurrence.
    ///
    /// Known quirk: when three or more lines of one product collapse onto
    /// the same size, only the first merged line survives and the later
    /// ones are dropped without adding their quantity.
    pub fn update_item_size(&mut self, product_id: &str, selected_size: &str) {
        let before = &self.items;

        let resized: Vec<LineItem> = before
            .iter()
            .enumerate()
            .map(|(pos, line)| {
                if line.product.id != product_id {
                    return line.clone();
                }

                let collision = before
                    .iter()
                    .enumerate()
                    .find(|(other, l)| *other != pos && l.is_sized_as(product_id, selected_size));

                match collision {
                    Some((_, existing)) => LineItem {
                        quantity: existing.quantity.saturating_add(line.quantity),
                        ..existing.clone()
                    },
                    None => LineItem {
                        selected_size: Some(selected_size.to_string()),
                        ..line.clone()
                    },
                }
            })
            .collect();

        let mut seen = HashSet::new();
        let total_before = resized.len();
        self.items = resized
            .into_iter()
            .filter(|line| seen.insert((line.product.id.clone(), line.selected_size.clone())))
            .collect();

        let dropped = total_before - self.items.len();
        if dropped > 0 {
            debug!(product_id, selected_size, dropped, "collapsed lines after size change");
        }
    }

    /// Swaps the line for `old_product_id` for `new_product`.
    ///
    /// The replacement counts as same-category when `new_product` is already
    /// in the cart or shares a category with the old line's product. A
    /// same-category swap keeps the old line's quantity (default 1 when the
    /// old line is missing); otherwise the requested `quantity` is used.
    ///
    /// If a line for `new_product` (with `selected_size`, when sized) remains
    /// after the old line is removed, it is updated in place: same-category
    /// takes `max(existing, old)`, otherwise `existing + quantity`. Variants
    /// and size are only overwritten when given.
    pub fn replace_item(
        &mut self,
        old_product_id: &str,
        new_product: &Product,
        quantity: i64,
        selected_variants: Option<VariantSelection>,
        selected_size: Option<String>,
    ) {
        let old_line = self
            .items
            .iter()
            .find(|line| line.product.id == old_product_id);
        let old_quantity = old_line.map_or(DEFAULT_QUANTITY, |line| line.quantity);
        let shares_category =
            old_line.is_some_and(|line| line.product.shares_category_with(new_product));
        let already_in_cart = self
            .items
            .iter()
            .any(|line| line.product.id == new_product.id);
        let same_category = already_in_cart || shares_category;

        self.remove_item(old_product_id);

        match self
            .items
            .iter_mut()
            .find(|line| line.matches(new_product, selected_size.as_deref()))
        {
            Some(existing) => {
                existing.quantity = if same_category {
                    existing.quantity.max(old_quantity)
                } else {
                    existing.quantity.saturating_add(quantity)
                };
                if selected_variants.is_some() {
                    existing.selected_variants = selected_variants;
                }
                if selected_size.is_some() {
                    existing.selected_size = selected_size;
                }
            }
            None => {
                let quantity = if same_category { old_quantity } else { quantity };
                self.items.push(LineItem::new(
                    new_product.clone(),
                    quantity,
                    selected_variants,
                    selected_size,
                ));
            }
        }

        debug!(old_product_id, new_product_id = %new_product.id, same_category, "replaced cart line");
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> i64 {
        item_count(&self.items)
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_amount<P: PriceResolver + ?Sized>(&self, pricing: &P) -> Money {
        total_amount(&self.items, pricing)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when no two lines share a [`crate::types::LineKey`].
    pub fn has_unique_keys(&self) -> bool {
        let mut keys = HashSet::with_capacity(self.items.len());
        self.items.iter().all(|line| keys.insert(line.key()))
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Sum of quantities over `lines`, saturating at `i64::MAX`.
pub fn item_count(lines: &[LineItem]) -> i64 {
    lines
        .iter()
        .fold(0i64, |count, line| count.saturating_add(line.quantity))
}

/// Sum of effective unit price times quantity over `lines`.
pub fn total_amount<P: PriceResolver + ?Sized>(lines: &[LineItem], pricing: &P) -> Money {
    lines.iter().map(|line| pricing.line_total(line)).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
