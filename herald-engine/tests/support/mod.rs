//! Shared test harness: a scripted transport and engine wiring over the
//! memory store.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use herald_common::{CampaignRecord, CampaignStatus};
use herald_delivery::{
    DeliveryClient, RetryController, RetryPolicy, Transport, TransportError, WireResponse,
};
use herald_engine::{ControlMonitor, DispatchEngine};
use herald_store::{CampaignStore, MemoryCampaignStore};

/// Transport that answers per-recipient scripted status codes and records
/// every attempt. Recipients without a script always succeed.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    latency: Option<Duration>,
    scripts: Mutex<HashMap<String, VecDeque<u16>>>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artificial per-request latency, for tests that inject
    /// control signals while a send is in flight.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Script the status codes returned for one recipient, in order.
    /// Once the script runs out the recipient succeeds.
    pub fn respond(&self, recipient: &str, statuses: &[u16]) {
        self.scripts
            .lock()
            .expect("script lock")
            .insert(recipient.to_string(), statuses.iter().copied().collect());
    }

    /// Number of POSTs issued for one recipient.
    pub fn attempts_for(&self, recipient: &str) -> usize {
        self.attempts
            .lock()
            .expect("attempts lock")
            .iter()
            .filter(|r| r.as_str() == recipient)
            .count()
    }

    /// Total number of POSTs issued.
    pub fn total_attempts(&self) -> usize {
        self.attempts.lock().expect("attempts lock").len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(
        &self,
        _url: &str,
        body: &serde_json::Value,
    ) -> Result<WireResponse, TransportError> {
        let recipient = body["recipient"]["id"].as_str().unwrap_or("").to_string();
        self.attempts
            .lock()
            .expect("attempts lock")
            .push(recipient.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let status = self
            .scripts
            .lock()
            .expect("script lock")
            .get_mut(&recipient)
            .and_then(VecDeque::pop_front)
            .unwrap_or(200);

        let body = match status {
            200 => format!(r#"{{"recipient_id":"{recipient}","message_id":"mid.1"}}"#),
            400 => r#"{"error":{"message":"invalid recipient","code":100}}"#.to_string(),
            _ => format!(r#"{{"error":{{"message":"upstream error","code":{status}}}}}"#),
        };

        Ok(WireResponse { status, body })
    }
}

/// Retry policy with real semantics but test-speed delays.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        base_delay_ms: 1,
        max_delay_ms: 4,
        jitter_ms: 0,
    }
}

/// Wire an engine over the given store and transport, with a fast pause
/// poll so tests settle quickly.
pub fn engine(store: Arc<dyn CampaignStore>, transport: Arc<ScriptedTransport>) -> DispatchEngine {
    let client = DeliveryClient::new(transport, "https://api.example.test");
    let delivery = RetryController::new(client, fast_policy());
    let monitor = ControlMonitor::new(store.clone(), Duration::from_millis(10));

    DispatchEngine::new(store, delivery, monitor)
}

pub fn memory_store() -> Arc<dyn CampaignStore> {
    Arc::new(MemoryCampaignStore::new())
}

/// A valid pending campaign over the given audience.
pub fn pending_campaign(audience: &[&str]) -> CampaignRecord {
    CampaignRecord {
        status: CampaignStatus::Pending,
        audience: audience.iter().map(ToString::to_string).collect(),
        message: Some("hello there".to_string()),
        page_id: "page-1".to_string(),
        access_token: "token-1".to_string(),
        ..Default::default()
    }
}
