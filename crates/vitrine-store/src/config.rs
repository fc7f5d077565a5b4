//! # Cart Configuration
//!
//! Where the cart is stored and how loudly it logs.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VITRINE_STORAGE_BACKEND=file                                       │
//! │     VITRINE_STORAGE_KEY=cart                                           │
//! │     VITRINE_DATA_DIR=/var/lib/vitrine                                  │
//! │     VITRINE_LOG=debug                                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/vitrine/cart.toml (Linux)                                │
//! │     ~/Library/Application Support/shop.vitrine.vitrine/cart.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     file backend, key "cart", platform data dir                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! backend = "file"   # file | memory
//! key = "cart"
//! data_dir = "/var/lib/vitrine"
//!
//! [logging]
//! filter = "info,vitrine=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::kv::{validate_key, FileStore, KeyValueStore, MemoryStore};
use crate::persistence::{CartPersistence, DEFAULT_CART_KEY};
use crate::state::CartStore;

// =============================================================================
// Storage Backend
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Nothing survives the process.
    Memory,

    /// One JSON file per key under the data directory.
    #[default]
    File,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "file" | "disk" => Ok(StorageBackend::File),
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: memory, file",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Key the cart record is stored under.
    #[serde(default = "default_key")]
    pub key: String,

    /// Directory for the file backend. Platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageBackend::default(),
            key: default_key(),
            data_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` wins over it.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info,vitrine=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_filter(),
        }
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl CartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.storage.key.is_empty() {
            return Err(StoreError::InvalidConfig(
                "storage.key must not be empty".into(),
            ));
        }

        validate_key(&self.storage.key).map_err(|_| {
            StoreError::InvalidConfig(format!(
                "storage.key '{}' may only contain letters, digits, '-', '_' and '.'",
                self.storage.key
            ))
        })
    }

    /// Applies `VITRINE_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(backend) = lookup("VITRINE_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding storage backend from environment");
                    self.storage.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown storage backend in environment"),
            }
        }

        if let Some(key) = lookup("VITRINE_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(dir) = lookup("VITRINE_DATA_DIR") {
            debug!(dir = %dir, "Overriding data directory from environment");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(filter) = lookup("VITRINE_LOG") {
            self.logging.filter = filter;
        }
    }

    /// `<config dir>/cart.toml` for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("shop", "vitrine", "vitrine")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Store Construction
    // =========================================================================

    /// Builds the configured key-value backend.
    pub fn key_value_store(&self) -> StoreResult<Box<dyn KeyValueStore>> {
        match self.storage.backend {
            StorageBackend::Memory => Ok(Box::new(MemoryStore::new())),
            StorageBackend::File => {
                let store = match &self.storage.data_dir {
                    Some(dir) => FileStore::new(dir),
                    None => FileStore::in_default_location()?,
                };
                debug!(dir = ?store.dir(), "Using file storage");
                Ok(Box::new(store))
            }
        }
    }

    /// Opens a [`CartStore`] on the configured backend and key.
    pub fn open_store(&self) -> StoreResult<CartStore> {
        let persistence = CartPersistence::new(self.key_value_store()?, self.storage.key.clone());
        Ok(CartStore::new(persistence))
    }
}
