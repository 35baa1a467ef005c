//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing tunables for the dispatch engine and the watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Status poll interval while a campaign is paused, in seconds.
    ///
    /// Default: 5 seconds
    #[serde(default = "defaults::poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Store scan interval of the create-trigger watcher, in seconds.
    ///
    /// Default: 5 seconds
    #[serde(default = "defaults::scan_interval_secs")]
    pub scan_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: defaults::poll_interval_secs(),
            scan_interval_secs: defaults::scan_interval_secs(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub const fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

mod defaults {
    pub const fn poll_interval_secs() -> u64 {
        5
    }

    pub const fn scan_interval_secs() -> u64 {
        5
    }
}
