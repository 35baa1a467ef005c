use std::sync::Arc;

use serde::Deserialize;

use crate::{
    backends::{FileCampaignStore, MemoryCampaignStore},
    r#trait::CampaignStore,
};

/// Configuration for the campaign store backend
///
/// This enum allows runtime selection of the store implementation
/// through configuration files.
///
/// # Examples
///
/// File-backed store in TOML config:
/// ```toml
/// [store]
/// type = "File"
/// path = "/var/lib/herald/campaigns"
/// ```
///
/// Memory-backed store for development:
/// ```toml
/// [store]
/// type = "Memory"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// File-based store (production)
    File(FileCampaignStore),
    /// Memory-based store (testing/development)
    ///
    /// Can optionally specify a capacity limit to prevent unbounded
    /// memory growth
    Memory(MemoryConfig),
}

/// Configuration for the memory-backed store
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MemoryConfig {
    /// Maximum number of campaigns to hold (omit for unlimited)
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::File(FileCampaignStore::default())
    }
}

impl StoreConfig {
    /// Get the filesystem path for file-backed stores, if applicable
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::File(store) => Some(store.path()),
            Self::Memory(_) => None,
        }
    }

    /// Convert the configuration into a concrete, initialised store
    ///
    /// This consumes the config and returns an Arc'd trait object that
    /// can be used polymorphically throughout the application.
    ///
    /// # Errors
    /// Returns an error if file store initialisation fails (directory
    /// creation, permissions, etc.)
    pub fn into_store(self) -> crate::Result<Arc<dyn CampaignStore>> {
        match self {
            Self::File(store) => {
                store.init()?;
                Ok(Arc::new(store))
            }
            Self::Memory(config) => Ok(config.capacity.map_or_else(
                || Arc::new(MemoryCampaignStore::new()) as Arc<dyn CampaignStore>,
                |capacity| Arc::new(MemoryCampaignStore::with_capacity(capacity)),
            )),
        }
    }
}
