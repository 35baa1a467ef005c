//! Retry policy for delivery operations.
//!
//! This module provides a clean abstraction over retry configuration and
//! logic, making it easy to test and reason about retry behavior
//! independently of the dispatch loop.

pub mod backoff;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policy::backoff::backoff_delay;

/// Retry policy configuration for a single recipient's delivery.
///
/// The attempt budget is local to one recipient and resets for each new
/// recipient in the audience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of send attempts before giving up on a recipient.
    ///
    /// Default: 5 attempts
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Base delay for exponential backoff (in milliseconds).
    ///
    /// The pre-jitter delay is calculated as: `base * 2^(attempt - 1)`
    ///
    /// Default: 500 ms
    #[serde(default = "defaults::base_delay_ms")]
    pub base_delay_ms: u64,

    /// Maximum backoff delay (in milliseconds), before jitter.
    ///
    /// Caps the exponential backoff to prevent excessively long delays.
    ///
    /// Default: 30000 ms (30 seconds)
    #[serde(default = "defaults::max_delay_ms")]
    pub max_delay_ms: u64,

    /// Additive jitter bound (in milliseconds).
    ///
    /// A uniform random value in `[0, jitter_ms]` is added to every
    /// backoff delay, preventing synchronized retry bursts against a
    /// rate-limited endpoint.
    ///
    /// Default: 500 ms
    #[serde(default = "defaults::jitter_ms")]
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            base_delay_ms: defaults::base_delay_ms(),
            max_delay_ms: defaults::max_delay_ms(),
            jitter_ms: defaults::jitter_ms(),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if another attempt should be made after `attempt` attempts.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Check if the given attempt is the final one in the budget.
    #[must_use]
    pub const fn is_final_attempt(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }

    /// Compute how long to sleep after a failed attempt.
    ///
    /// # Arguments
    /// * `attempt` - The attempt that just failed (1-indexed)
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        backoff_delay(
            attempt,
            self.base_delay_ms,
            self.max_delay_ms,
            self.jitter_ms,
        )
    }
}

mod defaults {
    pub const fn max_attempts() -> u32 {
        5
    }

    pub const fn base_delay_ms() -> u64 {
        500
    }

    pub const fn max_delay_ms() -> u64 {
        30_000
    }

    pub const fn jitter_ms() -> u64 {
        500
    }
}
