//! # Domain Types
//!
//! Types shared by the cart rules, the state manager and the storefront UI.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────┐   │
//! │  │    Product      │   │      LineItem       │   │    LineKey      │   │
//! │  │  ─────────────  │   │  ─────────────────  │   │  ─────────────  │   │
//! │  │  id             │◄──│  product            │──►│  Product(id)    │   │
//! │  │  price_cents    │   │  quantity           │   │  Sized(id,size) │   │
//! │  │  fee_included   │   │  selected_variants  │   └─────────────────┘   │
//! │  │  fee_rate_bps   │   │  selected_size      │                          │
//! │  │  sizes?         │   └─────────────────────┘                          │
//! │  │  category_ids?  │                                                    │
//! │  └─────────────────┘   ┌─────────────────────┐   ┌─────────────────┐   │
//! │                        │   DirectPurchase    │   │    FeeRate      │   │
//! │                        │  product, qty,      │   │  bps (u32)      │   │
//! │                        │  variant_id | size  │   │  825 = 8.25%    │   │
//! │                        └─────────────────────┘   └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `LineItem` holds a full copy of the `Product` it was created from. The
//! catalog owns products; the cart never mutates them, it only remembers
//! what the shopper saw when they clicked "add".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Key under which `DirectPurchase::variant_id` is stored in the line's
/// variant selection.
pub const DIRECT_PURCHASE_VARIANT_KEY: &str = "variant";

/// Selected product options (e.g. `"color" -> "red"`). Ordered so that the
/// persisted JSON is stable.
pub type VariantSelection = BTreeMap<String, String>;

// =============================================================================
// Fee Rate
// =============================================================================

/// Fee rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1900 bps = 19%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeRate(u32);

impl FeeRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        FeeRate(bps)
    }

    /// Creates a fee rate from a percentage (19.0 -> 1900 bps).
    pub fn from_percentage(pct: f64) -> Self {
        FeeRate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        FeeRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        FeeRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product as the storefront hands it to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Stable catalog identifier.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Base price in cents.
    pub price_cents: i64,

    /// Whether `price_cents` already contains the fee.
    #[serde(default)]
    pub fee_included: bool,

    /// Fee rate in basis points, applied when the fee is not included.
    #[serde(default)]
    pub fee_rate_bps: u32,

    /// Size options. `None` or empty means the product is not sized.
    #[serde(default)]
    pub sizes: Option<Vec<String>>,

    /// Category memberships, used to decide quantity carry-over on replace.
    #[serde(default)]
    pub category_ids: Option<Vec<String>>,
}

impl Product {
    /// Creates an unsized, uncategorized product with no fee.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price_cents: i64) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price_cents,
            fee_included: false,
            fee_rate_bps: 0,
            sizes: None,
            category_ids: None,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn fee_rate(&self) -> FeeRate {
        FeeRate::from_bps(self.fee_rate_bps)
    }

    /// True when the product offers at least one size, which makes the
    /// selected size part of a line's identity.
    pub fn has_sizes(&self) -> bool {
        self.sizes.as_ref().is_some_and(|sizes| !sizes.is_empty())
    }

    /// True when both products list at least one common category.
    pub fn shares_category_with(&self, other: &Product) -> bool {
        match (&self.category_ids, &other.category_ids) {
            (Some(ours), Some(theirs)) => ours.iter().any(|c| theirs.contains(c)),
            _ => false,
        }
    }
}

// =============================================================================
// Line Identity
// =============================================================================

/// Identity of a cart line for merge purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LineKey {
    /// Unsized products: one line per product.
    Product(String),
    /// Sized products: one line per (product, selected size).
    Sized(String, Option<String>),
}

impl LineKey {
    /// Computes the key a line for `product` with `selected_size` would have.
    pub fn for_selection(product: &Product, selected_size: Option<&str>) -> Self {
        if product.has_sizes() {
            LineKey::Sized(product.id.clone(), selected_size.map(str::to_string))
        } else {
            LineKey::Product(product.id.clone())
        }
    }

    pub fn product_id(&self) -> &str {
        match self {
            LineKey::Product(id) | LineKey::Sized(id, _) => id,
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One line of the cart.
///
/// Serialized with the field names the storefront persists:
/// `product`, `quantity`, `selectedVariants`, `selectedSize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Product snapshot taken when the line was created.
    pub product: Product,

    /// Units on this line.
    pub quantity: i64,

    #[serde(default)]
    pub selected_variants: Option<VariantSelection>,

    #[serde(default)]
    pub selected_size: Option<String>,
}

impl LineItem {
    pub fn new(
        product: Product,
        quantity: i64,
        selected_variants: Option<VariantSelection>,
        selected_size: Option<String>,
    ) -> Self {
        LineItem {
            product,
            quantity,
            selected_variants,
            selected_size,
        }
    }

    /// Identity of this line.
    pub fn key(&self) -> LineKey {
        LineKey::for_selection(&self.product, self.selected_size.as_deref())
    }

    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// True when this line is the one a selection of `product` (with
    /// `selected_size`) would merge into. The size only counts when
    /// `product` is sized.
    pub fn matches(&self, product: &Product, selected_size: Option<&str>) -> bool {
        self.product.id == product.id
            && (!product.has_sizes() || self.selected_size.as_deref() == selected_size)
    }

    /// True when this line is for `product_id` with exactly `selected_size`.
    pub fn is_sized_as(&self, product_id: &str, selected_size: &str) -> bool {
        self.product.id == product_id && self.selected_size.as_deref() == Some(selected_size)
    }
}

// =============================================================================
// Direct Purchase
// =============================================================================

/// A "buy now" request that bypasses the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectPurchase {
    pub product: Product,
    pub quantity: i64,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub selected_size: Option<String>,
}

impl DirectPurchase {
    pub fn new(product: Product, quantity: i64) -> Self {
        DirectPurchase {
            product,
            quantity,
            variant_id: None,
            selected_size: None,
        }
    }

    pub fn with_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = Some(size.into());
        self
    }

    /// Builds the single line that stands in for the cart.
    ///
    /// A variant id wins over a size: it is stored under
    /// [`DIRECT_PURCHASE_VARIANT_KEY`] and the size is dropped.
    pub fn into_line_item(self) -> LineItem {
        match self.variant_id {
            Some(variant_id) => {
                let mut variants = VariantSelection::new();
                variants.insert(DIRECT_PURCHASE_VARIANT_KEY.to_string(), variant_id);
                LineItem::new(self.product, self.quantity, Some(variants), None)
            }
            None => LineItem::new(self.product, self.quantity, None, self.selected_size),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
