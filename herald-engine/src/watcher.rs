//! Create-trigger watcher.
//!
//! Lists the store at a fixed interval and launches one engine task per
//! `pending` campaign. The one-way `pending -> in-progress` gate inside
//! the engine makes a duplicate claim harmless, but the in-flight set
//! keeps the watcher from spawning one in the first place. On shutdown
//! the watcher stops claiming and waits for in-flight runs to reach a
//! terminal state, so every processed recipient is checkpointed.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use herald_common::{CampaignStatus, Signal};
use herald_store::{CampaignId, CampaignStore};
use tokio::{sync::broadcast, task::JoinSet};
use tracing::{debug, info, warn};

use crate::engine::DispatchEngine;

/// Watches the store for newly created campaigns and dispatches them.
#[derive(Debug)]
pub struct CampaignWatcher {
    store: Arc<dyn CampaignStore>,
    engine: Arc<DispatchEngine>,
    scan_interval: Duration,
    in_flight: Arc<DashMap<CampaignId, ()>>,
}

impl CampaignWatcher {
    #[must_use]
    pub fn new(
        store: Arc<dyn CampaignStore>,
        engine: Arc<DispatchEngine>,
        scan_interval: Duration,
    ) -> Self {
        Self {
            store,
            engine,
            scan_interval,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Scan until a shutdown signal arrives, then drain in-flight runs.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<Signal>) {
        let mut tasks = JoinSet::new();

        info!(
            scan_interval_secs = self.scan_interval.as_secs(),
            "Campaign watcher started"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutdown signal received, no longer claiming campaigns");
                    break;
                }
                () = tokio::time::sleep(self.scan_interval) => {
                    if let Err(e) = self.scan(&mut tasks).await {
                        warn!(error = %e, "Store scan failed");
                    }
                    while tasks.try_join_next().is_some() {}
                }
            }
        }

        if !tasks.is_empty() {
            info!(
                in_flight = tasks.len(),
                "Waiting for in-flight campaigns to finish"
            );
        }
        while tasks.join_next().await.is_some() {}
    }

    /// One pass over the store: claim every unclaimed `pending` campaign.
    async fn scan(&self, tasks: &mut JoinSet<()>) -> herald_store::Result<()> {
        for id in self.store.list().await? {
            if self.in_flight.contains_key(&id) {
                continue;
            }

            let record = match self.store.get(&id).await {
                Ok(record) => record,
                // Deleted between list and get
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            };

            if record.status != CampaignStatus::Pending {
                continue;
            }

            info!(campaign = %id, audience = record.audience.len(), "Claiming campaign");
            self.in_flight.insert(id.clone(), ());

            let engine = self.engine.clone();
            let in_flight = self.in_flight.clone();
            tasks.spawn(async move {
                let outcome = engine.run(&id).await;
                debug!(campaign = %id, ?outcome, "Campaign run finished");
                in_flight.remove(&id);
            });
        }

        Ok(())
    }
}
