//! Engine-internal error handling.
//!
//! A campaign run itself never propagates an error to its trigger; these
//! errors travel between the engine's helpers and are converted into a
//! terminal `failed` state (or a halted run) at the top of the loop.

use herald_store::StoreError;
use thiserror::Error;

/// Failures inside a single campaign run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The store rejected a read or a checkpoint write.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The campaign document disappeared mid-run.
    #[error("Campaign record no longer exists")]
    RecordGone,
}

impl EngineError {
    /// Whether the record vanished, as opposed to the store misbehaving.
    #[must_use]
    pub const fn is_record_gone(&self) -> bool {
        match self {
            Self::RecordGone => true,
            Self::Store(err) => err.is_not_found(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
