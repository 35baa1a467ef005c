//! Backoff computation with exponential growth and additive jitter

use std::time::Duration;

use rand::Rng;

/// Calculate the sleep before the next attempt.
///
/// # Formula
/// `delay = min(base * 2^(attempt - 1), max_delay) + uniform(0, jitter)`
///
/// # Arguments
/// * `attempt` - The attempt that just failed (1-indexed)
/// * `base_delay_ms` - Base delay in milliseconds
/// * `max_delay_ms` - Cap on the pre-jitter delay, in milliseconds
/// * `jitter_ms` - Upper bound of the uniform additive jitter
#[must_use]
pub fn backoff_delay(attempt: u32, base_delay_ms: u64, max_delay_ms: u64, jitter_ms: u64) -> Duration {
    // Exponential backoff: base * 2^(attempt - 1), saturating to avoid
    // overflow on pathological attempt counts
    let exponent = attempt.saturating_sub(1);
    let delay = if exponent >= 63 {
        max_delay_ms
    } else {
        let multiplier = 1u64 << exponent; // 2^exponent
        base_delay_ms.saturating_mul(multiplier).min(max_delay_ms)
    };

    let jitter = if jitter_ms == 0 {
        0
    } else {
        rand::rng().random_range(0..=jitter_ms)
    };

    Duration::from_millis(delay.saturating_add(jitter))
}
