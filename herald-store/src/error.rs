//! Error types for the herald-store crate.
//!
//! This module provides typed error handling for campaign store
//! operations including file I/O, serialization, and validation.

use std::io;

use thiserror::Error;

use crate::CampaignId;

/// Top-level store error type.
///
/// All store operations return this error type, which categorizes
/// failures into I/O, serialization, validation, and logical errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O operation failed (file read/write/delete).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization or deserialization of a campaign document failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Campaign not found in the store.
    #[error("Campaign not found: {0}")]
    NotFound(CampaignId),

    /// Store directory validation failed.
    #[error("Store validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Campaign already exists in the store.
    #[error("Campaign already exists: {0}")]
    AlreadyExists(CampaignId),

    /// Internal error (lock poisoning, etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns `true` if the error means the record no longer exists.
    ///
    /// The dispatch loop treats a vanished record as a halt signal rather
    /// than an infrastructure failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Store directory validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Store path does not exist.
    #[error("Store path does not exist: {0}")]
    PathNotFound(String),

    /// Store path is not a directory.
    #[error("Store path is not a directory: {0}")]
    NotDirectory(String),

    /// Store path is unsafe (traversal components, system directory).
    #[error("Store path is not allowed: {0}")]
    UnsafePath(String),

    /// Invalid store configuration.
    #[error("Invalid store configuration: {0}")]
    InvalidConfiguration(String),
}

/// Specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

// Convenience conversion for lock poisoning
impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Internal(format!("Lock poisoned: {e}"))
    }
}
