//! Delivery client: one send attempt, classified.

use std::sync::Arc;

use herald_common::MessageContent;
use tracing::debug;

use crate::{
    transport::{Transport, WireResponse},
    types::{PageCredentials, SendOutcome, SendRequest},
};

/// Performs a single send attempt against the external delivery API and
/// classifies the outcome.
///
/// The client has no caller-visible side effects beyond the network call.
/// It never mutates campaign state, and it never raises: every attempt
/// resolves to a [`SendOutcome`].
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
}

impl DeliveryClient {
    /// Create a client over the given transport and endpoint base URL.
    pub fn new(transport: Arc<dyn Transport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    fn messages_url(&self, credentials: &PageCredentials<'_>) -> String {
        format!(
            "{}/{}/messages?access_token={}",
            self.endpoint.trim_end_matches('/'),
            credentials.page_id,
            credentials.access_token
        )
    }

    /// Issue one POST for `recipient` and classify the result.
    pub async fn send(
        &self,
        credentials: &PageCredentials<'_>,
        recipient: &str,
        content: &MessageContent,
    ) -> SendOutcome {
        let request = SendRequest::new(recipient, content);
        let body = match serde_json::to_value(&request) {
            Ok(body) => body,
            Err(e) => return SendOutcome::Permanent(format!("Failed to encode payload: {e}")),
        };

        let url = self.messages_url(credentials);

        debug!(page = %credentials.page_id, recipient = %recipient, "Sending message");

        match self.transport.post(&url, &body).await {
            Ok(response) => classify(&response),
            Err(e) if e.is_transient() => SendOutcome::Transient(e.to_string()),
            Err(e) => SendOutcome::Permanent(e.to_string()),
        }
    }
}

/// Rate limiting and server-side errors are worth retrying; everything
/// else is not.
const fn is_transient_code(code: u64) -> bool {
    code == 429 || code >= 500
}

fn snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .take(200)
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    &body[..end]
}

/// Classify a wire response into delivered / transient / permanent.
///
/// A 2xx status with no embedded `error` object is a delivery. An
/// embedded `error` object overrides the HTTP status: its `code` decides
/// retryability the same way the status would.
fn classify(response: &WireResponse) -> SendOutcome {
    let status = response.status;
    let success = (200..300).contains(&status);

    match serde_json::from_str::<serde_json::Value>(&response.body) {
        Ok(body) => {
            if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
                let code = error
                    .get("code")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(u64::from(status));
                let message = error
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unspecified delivery API error");
                let reason = format!("HTTP {status}, error code {code}: {message}");

                if is_transient_code(code) || is_transient_code(u64::from(status)) {
                    SendOutcome::Transient(reason)
                } else {
                    SendOutcome::Permanent(reason)
                }
            } else if success {
                SendOutcome::Delivered(body)
            } else if is_transient_code(u64::from(status)) {
                SendOutcome::Transient(format!("HTTP {status}: {}", snippet(&response.body)))
            } else {
                SendOutcome::Permanent(format!("HTTP {status}: {}", snippet(&response.body)))
            }
        }
        // A successful status with an unparseable body breaks the API
        // contract; retrying will not help
        Err(_) if success => {
            SendOutcome::Permanent(format!("HTTP {status} with unparseable response body"))
        }
        Err(_) if is_transient_code(u64::from(status)) => {
            SendOutcome::Transient(format!("HTTP {status}: {}", snippet(&response.body)))
        }
        Err(_) => SendOutcome::Permanent(format!("HTTP {status}: {}", snippet(&response.body))),
    }
}
