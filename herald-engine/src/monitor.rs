//! Control-signal monitor.
//!
//! Pause and stop are communicated by external writers flipping the
//! record's `status` field; the engine observes them by re-reading the
//! record before every send. Reads always go to the store, never a cache,
//! so an external write becomes visible within one recipient (or one poll
//! interval while paused).

use std::{sync::Arc, time::Duration};

use herald_common::CampaignStatus;
use herald_store::{CampaignId, CampaignStore};
use tracing::debug;

use crate::error::Result;

/// Result of waiting out a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseWait {
    /// The status left `paused`; this is the first status observed after.
    Resumed(CampaignStatus),
    /// The record disappeared while paused.
    Halted,
}

/// Observes externally written control signals on a campaign record.
#[derive(Debug, Clone)]
pub struct ControlMonitor {
    store: Arc<dyn CampaignStore>,
    poll_interval: Duration,
}

impl ControlMonitor {
    /// Create a monitor polling at `poll_interval` while paused.
    #[must_use]
    pub fn new(store: Arc<dyn CampaignStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Fresh point read of the campaign's status.
    ///
    /// # Errors
    /// If the record cannot be read (including when it no longer exists).
    pub async fn current_status(&self, id: &CampaignId) -> Result<CampaignStatus> {
        Ok(self.store.get(id).await?.status)
    }

    /// Block while the campaign is paused.
    ///
    /// Polls the status at the configured interval and returns the first
    /// non-paused status observed. A record that disappears mid-pause
    /// yields [`PauseWait::Halted`].
    ///
    /// # Errors
    /// If a poll fails for a reason other than the record being gone.
    pub async fn wait_while_paused(&self, id: &CampaignId) -> Result<PauseWait> {
        loop {
            let status = match self.store.get(id).await {
                Ok(record) => record.status,
                Err(e) if e.is_not_found() => return Ok(PauseWait::Halted),
                Err(e) => return Err(e.into()),
            };

            if status != CampaignStatus::Paused {
                return Ok(PauseWait::Resumed(status));
            }

            debug!(campaign = %id, "Paused, waiting");
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
