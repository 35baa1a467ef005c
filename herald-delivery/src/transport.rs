//! Transport seam between the delivery client and the wire.
//!
//! The client owns payload construction and outcome classification; the
//! transport owns only "POST this JSON, give me back status and body".
//! That split keeps the retry controller fully testable with a scripted
//! transport.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Raw response from the delivery endpoint, before classification.
#[derive(Debug, Clone)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, unparsed.
    pub body: String,
}

/// Transport-level failures, below the HTTP response layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not reach the endpoint.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The request could not be built or sent for a non-network reason.
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

impl TransportError {
    /// Returns `true` if a retry may plausibly succeed.
    ///
    /// Connection failures and timeouts are transient; a request that
    /// cannot even be built will not improve on retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

/// One-shot JSON POST against the delivery endpoint.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Issue a single POST of `body` to `url`.
    ///
    /// # Errors
    /// Returns a [`TransportError`] only for failures below the HTTP
    /// layer; any received HTTP response, success or not, is a
    /// [`WireResponse`].
    async fn post(&self, url: &str, body: &serde_json::Value)
    -> Result<WireResponse, TransportError>;
}

/// HTTPS transport backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given per-request timeout.
    ///
    /// # Errors
    /// If the underlying HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<WireResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else if e.is_connect() {
                    TransportError::Connection(e.to_string())
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;

        Ok(WireResponse { status, body })
    }
}
