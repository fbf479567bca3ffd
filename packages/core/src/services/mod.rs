//! Business Services
//!
//! - `SyncService` - session against the CRIPT API: save, refresh, get,
//!   search and reference resolution
//!
//! Services coordinate between the node graph and the gateway, enforcing the
//! primary/secondary persistence rules.

pub mod error;
pub mod sync_service;

pub use error::SyncError;
pub use sync_service::{query_string, SaveOutcome, SyncService};
