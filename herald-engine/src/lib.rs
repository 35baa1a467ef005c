//! Campaign dispatch engine.
//!
//! Drives a campaign from `pending` to a terminal state: one strictly
//! sequential worker per campaign, checkpointing every recipient outcome
//! through a store transaction and honoring externally written control
//! signals (pause/stop) between sends. The watcher observes the store and
//! launches one engine run per newly created campaign.

pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod watcher;

pub use checkpoint::{CheckpointCommitter, RecipientOutcome};
pub use config::EngineConfig;
pub use engine::{DispatchEngine, RunOutcome};
pub use error::EngineError;
pub use monitor::{ControlMonitor, PauseWait};
pub use watcher::CampaignWatcher;
