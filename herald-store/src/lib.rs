pub mod backends;
pub mod config;
pub mod error;
pub mod r#trait;
pub mod types;

pub use backends::{FileCampaignStore, MemoryCampaignStore};
pub use config::{MemoryConfig, StoreConfig};
pub use error::{Result, StoreError, ValidationError};
pub use r#trait::{CampaignStore, Transaction, TransactionFn, TransactionOutcome, UpdateFn};
pub use types::CampaignId;
