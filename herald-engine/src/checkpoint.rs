//! Checkpoint committer.
//!
//! Every processed recipient ends in exactly one checkpoint: a single
//! store transaction that advances the cursor, increments exactly one of
//! the two counters, and refreshes the progress diagnostics. Crash
//! recovery resumes from the last committed checkpoint, which bounds
//! duplicate delivery to at most the one recipient in flight.

use std::sync::Arc;

use chrono::Utc;
use herald_delivery::DeliveryError;
use herald_store::{CampaignId, CampaignStore, Transaction};
use tracing::debug;

use crate::error::Result;

/// Final verdict for one recipient, as recorded in the checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientOutcome {
    /// The delivery API accepted the message.
    Delivered,
    /// The recipient's delivery failed permanently or exhausted retries.
    Failed(String),
}

impl From<&DeliveryError> for RecipientOutcome {
    fn from(err: &DeliveryError) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Commits per-recipient progress through store transactions.
#[derive(Debug, Clone)]
pub struct CheckpointCommitter {
    store: Arc<dyn CampaignStore>,
}

impl CheckpointCommitter {
    #[must_use]
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Record the outcome of one recipient and advance the cursor.
    ///
    /// The cursor moves to `next_index` whether the delivery succeeded or
    /// failed; a failed recipient is never re-attempted in this run.
    ///
    /// # Errors
    /// If the transaction cannot be committed. The caller must treat this
    /// as campaign-fatal: with the checkpoint lost, the cursor and the
    /// counters can no longer be trusted to agree.
    pub async fn commit(
        &self,
        id: &CampaignId,
        recipient: String,
        outcome: RecipientOutcome,
        next_index: usize,
    ) -> Result<()> {
        debug!(
            campaign = %id,
            recipient = %recipient,
            next_index,
            delivered = outcome == RecipientOutcome::Delivered,
            "Checkpointing recipient"
        );

        self.store
            .transaction(
                id,
                Box::new(move |record| {
                    match outcome {
                        RecipientOutcome::Delivered => {
                            record.success_count += 1;
                            record.last_error = None;
                        }
                        RecipientOutcome::Failed(reason) => {
                            record.failure_count += 1;
                            record.last_error = Some(reason);
                        }
                    }

                    record.current_index = next_index;
                    record.last_processed = Some(Utc::now());
                    record.last_recipient = Some(recipient);

                    Transaction::Commit
                }),
            )
            .await?;

        Ok(())
    }
}
