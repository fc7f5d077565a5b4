//! # Error Types
//!
//! Domain-specific error types for vitrine-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vitrine-core (this file)                                              │
//! │  └── CoreError     - catalog lookups and catalog parsing               │
//! │                                                                         │
//! │  vitrine-store (separate crate)                                        │
//! │  └── StoreError    - key-value I/O, config, provider misuse            │
//! │                                                                         │
//! │  Cart operations themselves never fail: a non-positive quantity means  │
//! │  "remove", an unknown product id means "nothing to do".                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product with this id in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Two catalog entries share an id.
    #[error("Duplicate product id in catalog: {0}")]
    DuplicateProduct(String),

    /// Catalog document could not be parsed.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(#[from] serde_json::Error),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
