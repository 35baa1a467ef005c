//! Service configuration.
//!
//! A single TOML document selects the store backend and tunes the
//! delivery and engine timings. Every section is optional except the
//! store path for file-backed deployments:
//!
//! ```toml
//! [store]
//! type = "File"
//! path = "/var/lib/herald/campaigns"
//!
//! [delivery]
//! endpoint = "https://graph.facebook.com/v17.0"
//! timeout_secs = 30
//!
//! [delivery.retry]
//! max_attempts = 5
//! base_delay_ms = 500
//!
//! [engine]
//! poll_interval_secs = 5
//! scan_interval_secs = 5
//! ```

use std::path::Path;

use herald_delivery::DeliveryConfig;
use herald_engine::EngineConfig;
use herald_store::StoreConfig;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Campaign store backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// Delivery endpoint, timeout, and retry policy.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Pause poll and watcher scan intervals.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    /// Load and parse a TOML configuration file.
    ///
    /// # Errors
    /// If the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
