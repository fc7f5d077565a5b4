//! # Store Error Types
//!
//! Errors raised by storage backends, configuration loading and the scoped
//! cart provider.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  std::io / serde_json / toml                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module)                                              │
//! │       │                                                                 │
//! │       ├──► CartPersistence: logged and swallowed (best effort)         │
//! │       ├──► CartConfig::load: returned, or defaulted by load_or_default │
//! │       └──► use_cart(): returned to the caller (programmer error)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Backend I/O failure.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Key is empty or not usable by the backend.
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),

    /// A lock guarding an in-memory backend was poisoned.
    #[error("Storage lock poisoned")]
    LockPoisoned,

    /// No platform data directory and none configured.
    #[error("Could not determine a data directory; set storage.data_dir")]
    NoDataDirectory,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Consumer Contract
    // =========================================================================
    /// `use_cart()` was called with no `CartProvider` scope active.
    #[error("use_cart() called outside of a CartProvider scope; wrap the caller in CartProvider::scope")]
    OutsideProvider,
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}
