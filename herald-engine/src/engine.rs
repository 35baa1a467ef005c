//! Dispatch engine state machine.
//!
//! One run drives a single campaign from `pending` to a terminal state:
//!
//! ```text
//! Pending -> Validating -> InProgress <-> PausedWait
//!                              |
//!                              v
//!              { Completed | Stopped | Failed }
//! ```
//!
//! The run is strictly sequential over the audience. Before every send it
//! re-reads the record's status so externally written pause/stop signals
//! take effect within one recipient. Every recipient outcome is persisted
//! through a checkpoint transaction before the loop moves on.

use std::{sync::Arc, time::Duration};

use herald_common::{CampaignRecord, CampaignStatus};
use herald_delivery::{PageCredentials, RetryController};
use herald_store::{CampaignId, CampaignStore, Transaction};
use tracing::{error, info, warn};

use crate::{
    checkpoint::{CheckpointCommitter, RecipientOutcome},
    error::EngineError,
    monitor::{ControlMonitor, PauseWait},
};

/// How a campaign run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every audience element was processed and the campaign completed.
    Completed,
    /// The record was not `pending` when triggered; nothing was done.
    NoOp,
    /// An external stop signal ended the run early.
    Stopped,
    /// Validation failed, a checkpoint was lost, or `failed` was injected.
    Failed,
    /// The record disappeared mid-run; nothing left to write to.
    Halted,
}

/// Drives campaign runs end to end.
#[derive(Debug, Clone)]
pub struct DispatchEngine {
    store: Arc<dyn CampaignStore>,
    delivery: RetryController,
    monitor: ControlMonitor,
}

impl DispatchEngine {
    #[must_use]
    pub fn new(
        store: Arc<dyn CampaignStore>,
        delivery: RetryController,
        monitor: ControlMonitor,
    ) -> Self {
        Self {
            store,
            delivery,
            monitor,
        }
    }

    /// Run one campaign to a terminal state.
    ///
    /// Never returns an error: every failure path is absorbed into the
    /// record (terminal `failed`) or, when the record itself is gone,
    /// into [`RunOutcome::Halted`].
    pub async fn run(&self, id: &CampaignId) -> RunOutcome {
        match self.dispatch(id).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_record_gone() => {
                warn!(campaign = %id, "Campaign record disappeared mid-run");
                RunOutcome::Halted
            }
            Err(e) => {
                error!(campaign = %id, error = %e, "Campaign run failed");
                self.mark_failed(id, &e.to_string()).await
            }
        }
    }

    async fn dispatch(&self, id: &CampaignId) -> Result<RunOutcome, EngineError> {
        let snapshot = match self.claim(id).await? {
            Claim::NoOp => return Ok(RunOutcome::NoOp),
            Claim::Invalid => return Ok(RunOutcome::Failed),
            Claim::InProgress(snapshot) => snapshot,
        };

        // Validation guarantees content is present at claim time
        let Some(content) = snapshot.content() else {
            return Ok(self.mark_failed(id, "Campaign has no deliverable content").await);
        };
        let credentials = PageCredentials {
            page_id: &snapshot.page_id,
            access_token: &snapshot.access_token,
        };
        let pacing = Duration::from_secs(snapshot.delay_secs);
        let total = snapshot.audience.len();
        let committer = CheckpointCommitter::new(self.store.clone());

        info!(
            campaign = %id,
            audience = total,
            resume_from = snapshot.current_index,
            "Dispatching campaign"
        );

        for index in snapshot.current_index..total {
            match self.observe_control(id).await? {
                Control::Proceed => {}
                Control::Stop => {
                    info!(campaign = %id, index, "Stop signal observed, ending run");
                    return Ok(RunOutcome::Stopped);
                }
                Control::Fail => {
                    warn!(campaign = %id, index, "Failed status observed, ending run");
                    return Ok(RunOutcome::Failed);
                }
                Control::Halt => return Ok(RunOutcome::Halted),
            }

            let recipient = snapshot.audience[index].clone();
            let outcome = match self
                .delivery
                .send_with_retry(&credentials, &recipient, &content)
                .await
            {
                Ok(_) => RecipientOutcome::Delivered,
                Err(e) => RecipientOutcome::from(&e),
            };

            // A lost checkpoint is campaign-fatal: the cursor and the
            // counters can no longer be trusted to agree
            committer.commit(id, recipient, outcome, index + 1).await?;

            if !pacing.is_zero() && index + 1 < total {
                tokio::time::sleep(pacing).await;
            }
        }

        self.finalise(id).await
    }

    /// One-way gate from `pending` to `in-progress`.
    ///
    /// Re-entrant triggers on a non-pending record abort the transaction
    /// and the run is a silent no-op. Validation failures commit a
    /// terminal `failed` before any send is attempted.
    async fn claim(&self, id: &CampaignId) -> Result<Claim, EngineError> {
        let outcome = self
            .store
            .transaction(
                id,
                Box::new(|record| {
                    if record.status != CampaignStatus::Pending {
                        return Transaction::Abort;
                    }

                    match record.validate() {
                        Ok(()) => {
                            record.status = CampaignStatus::InProgress;
                            record.clamp_cursor();
                        }
                        Err(e) => {
                            record.status = CampaignStatus::Failed;
                            record.last_error = Some(e.to_string());
                        }
                    }

                    Transaction::Commit
                }),
            )
            .await?;

        if !outcome.is_committed() {
            info!(
                campaign = %id,
                status = %outcome.record().status,
                "Campaign is not pending, skipping"
            );
            return Ok(Claim::NoOp);
        }

        let record = outcome.into_record();
        if record.status == CampaignStatus::Failed {
            warn!(
                campaign = %id,
                error = record.last_error.as_deref().unwrap_or_default(),
                "Campaign failed validation"
            );
            return Ok(Claim::Invalid);
        }

        Ok(Claim::InProgress(Box::new(record)))
    }

    /// Observe control signals written since the previous recipient,
    /// waiting out a pause if one is in effect.
    async fn observe_control(&self, id: &CampaignId) -> Result<Control, EngineError> {
        let status = match self.monitor.current_status(id).await {
            Ok(status) => status,
            Err(e) if e.is_record_gone() => return Ok(Control::Halt),
            Err(e) => return Err(e),
        };

        let status = if status == CampaignStatus::Paused {
            info!(campaign = %id, "Pause signal observed");
            match self.monitor.wait_while_paused(id).await? {
                PauseWait::Resumed(status) => {
                    info!(campaign = %id, status = %status, "Pause lifted");
                    status
                }
                PauseWait::Halted => return Ok(Control::Halt),
            }
        } else {
            status
        };

        Ok(match status {
            CampaignStatus::Stopped => Control::Stop,
            CampaignStatus::Failed => Control::Fail,
            _ => Control::Proceed,
        })
    }

    /// Terminal completion that never overwrites an external signal.
    ///
    /// A `stopped` or `failed` written between the last checkpoint and
    /// this transaction wins; the abort path reports the status found.
    async fn finalise(&self, id: &CampaignId) -> Result<RunOutcome, EngineError> {
        let outcome = self
            .store
            .transaction(
                id,
                Box::new(|record| {
                    if matches!(
                        record.status,
                        CampaignStatus::Stopped | CampaignStatus::Failed
                    ) {
                        return Transaction::Abort;
                    }

                    record.status = CampaignStatus::Completed;
                    Transaction::Commit
                }),
            )
            .await?;

        let record = outcome.record();
        if outcome.is_committed() {
            info!(
                campaign = %id,
                successes = record.success_count,
                failures = record.failure_count,
                "Campaign completed"
            );
            return Ok(RunOutcome::Completed);
        }

        info!(
            campaign = %id,
            status = %record.status,
            "Campaign ended by external signal before completion"
        );
        Ok(match record.status {
            CampaignStatus::Failed => RunOutcome::Failed,
            _ => RunOutcome::Stopped,
        })
    }

    /// Escalate a run-level failure into a terminal `failed` record.
    ///
    /// An externally written `stopped` is left in place. Best effort: if
    /// even this write fails there is nothing left to do but log.
    async fn mark_failed(&self, id: &CampaignId, reason: &str) -> RunOutcome {
        let reason = reason.to_string();
        let result = self
            .store
            .transaction(
                id,
                Box::new(move |record| {
                    if record.status == CampaignStatus::Stopped {
                        return Transaction::Abort;
                    }

                    record.status = CampaignStatus::Failed;
                    record.last_error = Some(reason);
                    Transaction::Commit
                }),
            )
            .await;

        match result {
            Ok(outcome) if outcome.is_committed() => RunOutcome::Failed,
            Ok(_) => RunOutcome::Stopped,
            Err(e) if e.is_not_found() => {
                warn!(campaign = %id, "Campaign record disappeared before failure could be recorded");
                RunOutcome::Halted
            }
            Err(e) => {
                error!(campaign = %id, error = %e, "Could not record campaign failure");
                RunOutcome::Failed
            }
        }
    }
}

enum Claim {
    /// The record was not `pending`.
    NoOp,
    /// Validation failed; `failed` has been persisted.
    Invalid,
    /// The record snapshot as persisted at claim time.
    InProgress(Box<CampaignRecord>),
}

enum Control {
    Proceed,
    Stop,
    Fail,
    Halt,
}
