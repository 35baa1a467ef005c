//! Delivery configuration.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    client::DeliveryClient,
    policy::RetryPolicy,
    retry::RetryController,
    transport::{HttpTransport, TransportError},
};

/// Configuration for the outbound delivery channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Base URL of the delivery API, without a trailing slash.
    ///
    /// Default: `https://graph.facebook.com/v17.0`
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    ///
    /// Default: 30 seconds
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,

    /// Per-recipient retry policy.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            timeout_secs: defaults::timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }
}

impl DeliveryConfig {
    /// Build a retry controller over an HTTPS transport.
    ///
    /// # Errors
    /// If the underlying HTTP client cannot be constructed.
    pub fn into_controller(self) -> Result<RetryController, TransportError> {
        let transport = Arc::new(HttpTransport::new(Duration::from_secs(self.timeout_secs))?);
        let client = DeliveryClient::new(transport, self.endpoint);

        Ok(RetryController::new(client, self.retry))
    }
}

mod defaults {
    pub fn endpoint() -> String {
        "https://graph.facebook.com/v17.0".to_string()
    }

    pub const fn timeout_secs() -> u64 {
        30
    }
}
