//! Service Layer Error Types
//!
//! Errors from save, refresh, get and search. Node-model and gateway failures
//! are wrapped unchanged so callers can match on the original kind.

use crate::gateway::GatewayError;
use crate::models::NodeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Graph or validation failure raised before any network call
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    /// Transport failure, surfaced as reported by the gateway
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Secondary nodes have no independent remote identity
    #[error("{type_name} is a secondary node and cannot be {action} on its own")]
    NotPersistable { type_name: String, action: String },

    /// Operation needs a node that has been saved
    #[error("{type_name} has no url; save it first")]
    NotSaved { type_name: String },

    /// URL is outside the session or names no node type
    #[error("Invalid node URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl SyncError {
    /// Create a not persistable error
    pub fn not_persistable(type_name: impl Into<String>, action: impl Into<String>) -> Self {
        Self::NotPersistable {
            type_name: type_name.into(),
            action: action.into(),
        }
    }

    /// Create a not saved error
    pub fn not_saved(type_name: impl Into<String>) -> Self {
        Self::NotSaved {
            type_name: type_name.into(),
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
