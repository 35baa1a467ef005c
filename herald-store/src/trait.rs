//! Store trait for campaign documents.
//!
//! The dispatcher never touches storage directly: every read and write
//! goes through [`CampaignStore`], which keeps the engine testable against
//! a memory backend and lets deployments choose a durable backend at
//! runtime.

use async_trait::async_trait;
use herald_common::CampaignRecord;

use crate::{Result, types::CampaignId};

/// Decision returned by a transaction closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    /// Persist the mutated record.
    Commit,
    /// Discard the mutation, leaving the stored record untouched.
    Abort,
}

/// Result of a completed transaction, carrying the post-transaction view
/// of the record (the mutated record on commit, the stored record as it
/// was observed on abort).
#[derive(Debug, Clone)]
pub enum TransactionOutcome {
    Committed(CampaignRecord),
    Aborted(CampaignRecord),
}

impl TransactionOutcome {
    /// The record as seen at the end of the transaction.
    #[must_use]
    pub const fn record(&self) -> &CampaignRecord {
        match self {
            Self::Committed(record) | Self::Aborted(record) => record,
        }
    }

    /// Consume the outcome, yielding the record.
    #[must_use]
    pub fn into_record(self) -> CampaignRecord {
        match self {
            Self::Committed(record) | Self::Aborted(record) => record,
        }
    }

    /// Whether the closure committed its mutation.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Mutation applied by a non-transactional partial write.
pub type UpdateFn = Box<dyn FnOnce(&mut CampaignRecord) + Send>;

/// Read-modify-write closure executed under the store's transaction
/// discipline.
pub type TransactionFn = Box<dyn FnOnce(&mut CampaignRecord) -> Transaction + Send>;

/// Persistent store for campaign documents.
///
/// Implementations must guarantee that [`transaction`](Self::transaction)
/// executes its read-modify-write atomically with respect to concurrent
/// transactions and updates on the same store, so that a racing external
/// status write can never corrupt the cursor or counters.
#[async_trait]
pub trait CampaignStore: Send + Sync + std::fmt::Debug {
    /// Create a new campaign document and return its generated ID.
    ///
    /// # Errors
    /// If the record cannot be persisted.
    async fn create(&self, record: &CampaignRecord) -> Result<CampaignId>;

    /// Point read of a campaign document.
    ///
    /// Always reads fresh state; implementations must not cache. The
    /// control-signal monitor relies on this to observe pause/stop writes
    /// issued by external actors.
    ///
    /// # Errors
    /// [`StoreError::NotFound`](crate::StoreError::NotFound) if the
    /// campaign does not exist.
    async fn get(&self, id: &CampaignId) -> Result<CampaignRecord>;

    /// Non-transactional partial write: read, apply, write back.
    ///
    /// Intended for external operators (flipping `status` to paused or
    /// stopped) where last-writer-wins on the touched fields is
    /// acceptable. The engine itself always uses
    /// [`transaction`](Self::transaction).
    ///
    /// # Errors
    /// If the campaign does not exist or the write fails.
    async fn update(&self, id: &CampaignId, apply: UpdateFn) -> Result<()>;

    /// Atomic read-modify-write of a campaign document.
    ///
    /// The closure observes the current record, mutates it, and decides
    /// whether to commit. No other transaction or update on this store
    /// interleaves with the read and the write.
    ///
    /// # Errors
    /// If the campaign does not exist or the commit fails.
    async fn transaction(&self, id: &CampaignId, apply: TransactionFn)
    -> Result<TransactionOutcome>;

    /// List all campaign IDs, sorted by creation time.
    ///
    /// # Errors
    /// If the store cannot be enumerated.
    async fn list(&self) -> Result<Vec<CampaignId>>;

    /// Delete a campaign document.
    ///
    /// # Errors
    /// If the campaign does not exist or the delete fails.
    async fn delete(&self, id: &CampaignId) -> Result<()>;
}
