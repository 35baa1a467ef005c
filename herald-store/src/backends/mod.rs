pub mod file;
pub mod memory;

pub use file::FileCampaignStore;
pub use memory::MemoryCampaignStore;
