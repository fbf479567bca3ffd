//! SyncGateway Trait - Remote Service Abstraction
//!
//! The boundary between the node graph and the CRIPT REST service. The
//! service layer lowers nodes to JSON payloads and hands them to a gateway;
//! the gateway moves bytes and decodes responses. Implementations:
//!
//! - [`HttpGateway`](super::HttpGateway) - `reqwest` client for the real API
//! - in-memory doubles in tests
//!
//! # Design Decisions
//!
//! 1. **Payload-level**: gateways never see `Node`; routing uses the type's
//!    slug or the node URL the service layer already resolved
//! 2. **Writes report, reads raise**: `create`/`update` return the status and
//!    body whatever the status, so the caller can report a rejected save;
//!    `fetch`/`query` fail on non-success
//! 3. **No retries**: timeouts are configuration, retries are the caller's

use crate::gateway::GatewayError;
use crate::validation::Vocabulary;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Status and decoded body of a write
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Value,
}

impl RemoteResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Whether the server stored the record (200 or 201)
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    /// The returned record, when the body is a JSON object
    pub fn record(&self) -> Option<&Map<String, Value>> {
        self.body.as_object()
    }
}

/// Remote record store for CRIPT nodes
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// API root without trailing slash; remote records are under it
    fn base_url(&self) -> &str;

    /// Check connectivity and authentication
    ///
    /// # Errors
    ///
    /// `GatewayError::Auth` carrying the server's `detail` when the token is
    /// rejected; transport errors otherwise.
    async fn verify(&self) -> Result<(), GatewayError>;

    /// Load the controlled vocabulary table
    async fn fetch_vocabulary(&self) -> Result<Vocabulary, GatewayError>;

    /// POST a new record under `{base}/{slug}/`
    async fn create(&self, slug: &str, payload: &Value) -> Result<RemoteResponse, GatewayError>;

    /// PUT an existing record at its URL
    async fn update(&self, url: &str, payload: &Value) -> Result<RemoteResponse, GatewayError>;

    /// GET the record at `url`
    ///
    /// # Errors
    ///
    /// `GatewayError::NotFound` for 404; `GatewayError::Http` for other
    /// non-success statuses; `GatewayError::Decode` if the body is not an
    /// object.
    async fn fetch(&self, url: &str) -> Result<Map<String, Value>, GatewayError>;

    /// GET `{base}/{slug}/?{query}`, or `{base}/{slug}/` for an empty query
    ///
    /// The query string is sent as given; callers must pre-escape it.
    async fn query(&self, slug: &str, query: &str) -> Result<Value, GatewayError>;
}
