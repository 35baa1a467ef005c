use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use herald_common::CampaignRecord;

use crate::{
    StoreError,
    r#trait::{CampaignStore, Transaction, TransactionFn, TransactionOutcome, UpdateFn},
    types::CampaignId,
};

/// In-memory campaign store
///
/// This implementation holds campaign documents in a `HashMap` protected
/// by an `RwLock`. It's primarily intended for testing, but can also be
/// used for transient campaigns in development.
///
/// # Capacity Management
/// The store can be configured with a maximum capacity. When capacity is
/// reached, `create` fails with an error.
///
/// # Concurrency
/// Transactions and updates take the write lock for the full
/// read-modify-write, so a racing external status write observes either
/// the pre- or post-transaction record, never a torn one.
#[derive(Debug, Clone)]
pub struct MemoryCampaignStore {
    pub(crate) records: Arc<RwLock<HashMap<CampaignId, CampaignRecord>>>,
    /// Maximum number of campaigns to store (None = unlimited)
    capacity: Option<usize>,
}

impl MemoryCampaignStore {
    /// Create a new empty memory store with unlimited capacity
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            capacity: None,
        }
    }

    /// Create a new memory store with a capacity limit
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            capacity: Some(capacity),
        }
    }

    /// Get the current number of campaigns in the store
    ///
    /// Recovers gracefully if the lock is poisoned by accessing the
    /// underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the configured capacity (None = unlimited)
    #[must_use]
    pub const fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl Default for MemoryCampaignStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    async fn create(&self, record: &CampaignRecord) -> crate::Result<CampaignId> {
        let id = CampaignId::generate();

        let mut records = self.records.write()?;

        if let Some(cap) = self.capacity
            && !records.contains_key(&id)
            && records.len() >= cap
        {
            return Err(StoreError::Internal(format!(
                "Memory store capacity exceeded: {}/{} campaigns",
                records.len(),
                cap
            )));
        }

        records.insert(id.clone(), record.clone());

        Ok(id)
    }

    async fn get(&self, id: &CampaignId) -> crate::Result<CampaignRecord> {
        self.records
            .read()?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update(&self, id: &CampaignId, apply: UpdateFn) -> crate::Result<()> {
        let mut records = self.records.write()?;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        apply(record);
        Ok(())
    }

    async fn transaction(
        &self,
        id: &CampaignId,
        apply: TransactionFn,
    ) -> crate::Result<TransactionOutcome> {
        // The write lock spans the whole read-modify-write
        let mut records = self.records.write()?;
        let stored = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut candidate = stored.clone();
        match apply(&mut candidate) {
            Transaction::Commit => {
                *stored = candidate.clone();
                Ok(TransactionOutcome::Committed(candidate))
            }
            Transaction::Abort => Ok(TransactionOutcome::Aborted(stored.clone())),
        }
    }

    async fn list(&self) -> crate::Result<Vec<CampaignId>> {
        let mut ids: Vec<_> = self.records.read()?.keys().cloned().collect();

        // ULIDs are lexicographically sortable by creation time
        ids.sort();

        Ok(ids)
    }

    async fn delete(&self, id: &CampaignId) -> crate::Result<()> {
        self.records
            .write()?
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(())
    }
}
