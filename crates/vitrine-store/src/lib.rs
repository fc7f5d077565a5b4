//! # vitrine-store: Live Cart State for Vitrine
//!
//! Holds the one cart a storefront session works with: restores it at
//! startup, applies the `vitrine-core` rules, persists after every change
//! and tells subscribers about it.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartConfig::load ──► open_store ──► CartStore                          │
//! │                                        │                                │
//! │        add / remove / replace ─────────┤                                │
//! │                                        ├──► vitrine_core::Cart          │
//! │                                        ├──► CartPersistence ──► KV      │
//! │                                        └──► subscribers(CartSnapshot)   │
//! │                                                                         │
//! │  CartProvider::scope(store, ..) ──► use_cart() anywhere inside          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`] - CartStore, modes, snapshots, subscriptions
//! - [`persistence`] - JSON record under a single key
//! - [`kv`] - KeyValueStore trait with memory and file backends
//! - [`provider`] - Thread-local provider scope and `use_cart`
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Store error types

pub mod config;
pub mod error;
pub mod kv;
pub mod persistence;
pub mod provider;
pub mod state;

pub use config::{CartConfig, StorageBackend};
pub use error::{StoreError, StoreResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use persistence::{CartPersistence, DEFAULT_CART_KEY};
pub use provider::{use_cart, CartProvider, SharedCart};
pub use state::{CartMode, CartSnapshot, CartStore, SubscriptionId};
