//! # vitrine-core: Pure Cart Logic for Vitrine
//!
//! This crate holds the storefront cart's business rules as pure functions
//! over plain data. Nothing here touches storage, the network or global
//! state.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrine Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Storefront UI / vitrine-cli                         │   │
//! │  │    Product page ──► Cart drawer ──► Buy now ──► Checkout        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ subscribe / operations                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          vitrine-store (CartStore, persistence)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vitrine-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  pricing  │   │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ Resolver  │   │   │
//! │  │   │ LineItem  │  │  FeeRate  │  │  rules    │  │ Standard  │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, LineItem, LineKey, DirectPurchase, FeeRate
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - Effective unit price resolution
//! - [`cart`] - Line reconciliation rules and totals
//! - [`catalog`] - Id to product lookup
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use vitrine_core::{Cart, Product, StandardPricing};
//!
//! let mug = Product::new("mug", "Stoneware Mug", 1200);
//!
//! let mut cart = Cart::new();
//! cart.add_item(&mug, 2, None, None);
//! cart.add_item(&mug, 1, None, None);
//!
//! assert_eq!(cart.line_count(), 1);
//! assert_eq!(cart.item_count(), 3);
//! assert_eq!(cart.total_amount(&StandardPricing).cents(), 3600);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use catalog::Catalog;
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use pricing::{PriceResolver, StandardPricing};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity used when a caller does not specify one (add, replace).
pub const DEFAULT_QUANTITY: i64 = 1;
