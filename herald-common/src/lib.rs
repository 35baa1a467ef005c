pub mod campaign;
pub mod logging;

pub use campaign::{CampaignRecord, CampaignStatus, MessageContent, ValidationError};
pub use tracing;

/// Signal broadcast to long-running tasks during shutdown.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    Shutdown,
}
