//! Sync Gateway
//!
//! Transport boundary to the CRIPT REST service:
//!
//! - `SyncGateway` - the async trait the service layer depends on
//! - `HttpGateway` - `reqwest` implementation
//! - `GatewayConfig` - connection settings
//! - `GatewayError` - transport failures

mod config;
mod error;
mod http_gateway;
mod sync_gateway;

pub use config::{GatewayConfig, API_TOKEN_ENV, API_URL_ENV, TIMEOUT_ENV};
pub use error::GatewayError;
pub use http_gateway::HttpGateway;
pub use sync_gateway::{RemoteResponse, SyncGateway};
