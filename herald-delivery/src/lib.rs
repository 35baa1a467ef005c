pub mod client;
pub mod config;
pub mod error;
pub mod policy;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::DeliveryClient;
pub use config::DeliveryConfig;
pub use error::DeliveryError;
pub use policy::RetryPolicy;
pub use retry::RetryController;
pub use transport::{HttpTransport, Transport, TransportError, WireResponse};
pub use types::{PageCredentials, SendOutcome, SendRequest};
