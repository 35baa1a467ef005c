//! Typed error handling for delivery operations.
//!
//! A send attempt classifies into delivered / transient / permanent (see
//! [`SendOutcome`](crate::SendOutcome)); this module covers the errors
//! that escape the retry controller once classification and bounded
//! retries are done.

use thiserror::Error;

/// Failure of one recipient's delivery, after the retry controller has
/// finished with it.
///
/// This is a per-recipient business failure: the dispatch loop records it
/// against the campaign and moves on to the next recipient. It never
/// aborts the campaign.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The delivery API rejected the message and a retry cannot help.
    #[error("Permanent failure: {0}")]
    Permanent(String),

    /// Every attempt failed transiently and the attempt budget ran out.
    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

impl DeliveryError {
    /// The underlying failure message, without the classification prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Permanent(message)
            | Self::Exhausted {
                last_error: message,
                ..
            } => message,
        }
    }

    /// Returns `true` if the failure was a retry-budget exhaustion rather
    /// than an outright rejection.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
