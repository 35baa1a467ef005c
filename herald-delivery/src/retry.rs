//! Bounded retry around a single recipient's delivery.

use herald_common::MessageContent;
use tracing::{debug, warn};

use crate::{
    client::DeliveryClient,
    error::DeliveryError,
    policy::RetryPolicy,
    types::{PageCredentials, SendOutcome},
};

/// Drives one recipient's delivery to a final verdict.
///
/// Transient failures are retried with exponential backoff until the
/// policy's attempt budget runs out; permanent failures end the attempt
/// sequence immediately. The budget is per recipient and resets for the
/// next one.
#[derive(Debug, Clone)]
pub struct RetryController {
    client: DeliveryClient,
    policy: RetryPolicy,
}

impl RetryController {
    /// Wrap a delivery client with the given retry policy.
    #[must_use]
    pub const fn new(client: DeliveryClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Deliver to one recipient, retrying transient failures.
    ///
    /// # Errors
    /// [`DeliveryError::Permanent`] when the API rejects the message
    /// outright, [`DeliveryError::Exhausted`] when every attempt in the
    /// budget failed transiently.
    pub async fn send_with_retry(
        &self,
        credentials: &PageCredentials<'_>,
        recipient: &str,
        content: &MessageContent,
    ) -> Result<serde_json::Value, DeliveryError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.client.send(credentials, recipient, content).await {
                SendOutcome::Delivered(response) => {
                    debug!(recipient = %recipient, attempt, "Delivered");
                    return Ok(response);
                }
                SendOutcome::Permanent(reason) => {
                    warn!(recipient = %recipient, attempt, reason = %reason, "Permanent failure");
                    return Err(DeliveryError::Permanent(reason));
                }
                SendOutcome::Transient(reason) => {
                    if self.policy.is_final_attempt(attempt) {
                        warn!(
                            recipient = %recipient,
                            attempts = attempt,
                            reason = %reason,
                            "Retries exhausted"
                        );
                        return Err(DeliveryError::Exhausted {
                            attempts: attempt,
                            last_error: reason,
                        });
                    }

                    let delay = self.policy.backoff_delay(attempt);
                    debug!(
                        recipient = %recipient,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        reason = %reason,
                        "Transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
