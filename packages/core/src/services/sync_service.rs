//! Sync Service
//!
//! Session-level operations that move nodes between the in-memory graph and
//! the CRIPT service:
//!
//! - `connect` - verify the token and load the session vocabulary
//! - `save` - create or update a primary node, then apply the server record
//! - `refresh` - overwrite a saved node with current server state
//! - `get` - materialize a node from its URL
//! - `search` - raw listing/search results for a primary type
//! - `resolve` - dereference a remote reference
//!
//! Lowering happens before any network call, so a graph with an unsaved
//! primary node never produces a partial remote write.

use crate::gateway::{GatewayError, SyncGateway};
use crate::models::{registry, Node, Reference};
use crate::resolver;
use crate::services::SyncError;
use crate::validation::ValidationContext;
use serde_json::Value;
use std::sync::Arc;

/// Result of a save the gateway completed
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// New record; the node now has its URL and timestamps
    Created,
    /// Existing record replaced
    Updated,
    /// The server answered with a status other than 200/201; the node is unchanged
    Rejected { status: u16, body: Value },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// `key=value` pairs joined by `&`, sent as given (no escaping)
pub fn query_string(filter: &[(&str, &str)]) -> String {
    filter
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// One authenticated session against a [`SyncGateway`]
pub struct SyncService {
    gateway: Arc<dyn SyncGateway>,
    context: ValidationContext,
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("base_url", &self.gateway.base_url())
            .field("context", &self.context)
            .finish()
    }
}

impl SyncService {
    /// Verify the connection and load the vocabulary for this session
    ///
    /// # Errors
    ///
    /// `SyncError::Gateway(GatewayError::Auth { .. })` if the token is
    /// rejected; any transport error from the vocabulary load.
    pub async fn connect(gateway: Arc<dyn SyncGateway>) -> Result<Self, SyncError> {
        gateway.verify().await?;
        let vocabulary = gateway.fetch_vocabulary().await?;
        tracing::info!(
            base_url = gateway.base_url(),
            categories = ?vocabulary.categories().collect::<Vec<_>>(),
            keys = vocabulary.len(),
            "Session vocabulary loaded"
        );
        Ok(Self {
            gateway,
            context: ValidationContext::new(vocabulary),
        })
    }

    /// Session with an already-built validation context (no network calls)
    pub fn with_context(gateway: Arc<dyn SyncGateway>, context: ValidationContext) -> Self {
        Self { gateway, context }
    }

    /// Validation context carrying this session's vocabulary
    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    pub fn base_url(&self) -> &str {
        self.gateway.base_url()
    }

    /// Validate every vocabulary-bound field of `node` against the session
    pub fn validate(&self, node: &mut Node) -> Result<(), SyncError> {
        node.validate_vocabulary(&self.context)?;
        Ok(())
    }

    /// Save a primary node: create when it has no URL, update otherwise
    ///
    /// On 200/201 the returned record is applied to `node`. Any other status
    /// is reported as [`SaveOutcome::Rejected`] with the server's body and
    /// leaves `node` untouched.
    ///
    /// # Errors
    ///
    /// - `NotPersistable` for secondary nodes
    /// - `Node(UnsavedNode)` when lowering finds an unsaved primary reference;
    ///   no request is sent
    /// - gateway failures
    pub async fn save(&self, node: &mut Node) -> Result<SaveOutcome, SyncError> {
        let slug = match node.schema().slug {
            Some(slug) if node.is_primary() => slug,
            _ => return Err(SyncError::not_persistable(node.type_name(), "saved")),
        };
        let payload = Value::Object(node.prepare_for_transmission()?);

        let (response, created) = match node.url() {
            None => {
                tracing::debug!(node_type = node.type_name(), "Creating remote record");
                (self.gateway.create(slug, &payload).await?, true)
            }
            Some(url) => {
                tracing::debug!(node_type = node.type_name(), url, "Updating remote record");
                (self.gateway.update(url, &payload).await?, false)
            }
        };

        if !response.is_accepted() {
            tracing::warn!(
                node_type = node.type_name(),
                status = response.status,
                "Save rejected by server"
            );
            return Ok(SaveOutcome::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        let record = response
            .record()
            .ok_or_else(|| GatewayError::decode("save response is not a JSON object"))?;
        node.apply_remote_state(record, self.base_url())?;
        tracing::info!(
            node_type = node.type_name(),
            url = node.url().unwrap_or_default(),
            "{} saved",
            node.type_name()
        );

        Ok(if created {
            SaveOutcome::Created
        } else {
            SaveOutcome::Updated
        })
    }

    /// Overwrite a saved primary node with the server's current record
    pub async fn refresh(&self, node: &mut Node) -> Result<(), SyncError> {
        if !node.is_primary() {
            return Err(SyncError::not_persistable(node.type_name(), "refreshed"));
        }
        let url = node
            .url()
            .map(str::to_string)
            .ok_or_else(|| SyncError::not_saved(node.type_name()))?;

        let record = self.gateway.fetch(&url).await?;
        node.apply_remote_state(&record, self.base_url())?;
        tracing::debug!(url = url.as_str(), "Refreshed from remote");
        Ok(())
    }

    /// Fetch and materialize the node at `url`
    ///
    /// The node type is taken from the URL's second-to-last path segment.
    ///
    /// # Errors
    ///
    /// `InvalidUrl` if `url` is malformed, outside this session's base URL,
    /// or names no registered primary type.
    pub async fn get(&self, url: &str) -> Result<Node, SyncError> {
        url::Url::parse(url).map_err(|e| SyncError::invalid_url(url, e.to_string()))?;
        if !url.starts_with(self.base_url()) {
            return Err(SyncError::invalid_url(url, "not under the session base URL"));
        }
        let schema = registry()
            .for_url(url)
            .ok_or_else(|| SyncError::invalid_url(url, "no node type for URL"))?;

        let record = self.gateway.fetch(url).await?;
        let node = Node::from_payload(schema.type_name, &record)?;
        tracing::debug!(url, node_type = schema.type_name, "Fetched node");
        Ok(node)
    }

    /// Search records of a primary type; the raw JSON result is returned
    pub async fn search(
        &self,
        type_name: &str,
        filter: &[(&str, &str)],
    ) -> Result<Value, SyncError> {
        let schema = registry().require(type_name)?;
        let slug = match schema.slug {
            Some(slug) if schema.is_primary() => slug,
            _ => return Err(SyncError::not_persistable(type_name, "searched")),
        };

        let query = query_string(filter);
        tracing::debug!(node_type = type_name, query = query.as_str(), "Searching");
        Ok(self.gateway.query(slug, &query).await?)
    }

    /// Fetch the node a remote reference points at
    pub async fn resolve(&self, reference: &Reference) -> Result<Node, SyncError> {
        resolver::dereference(reference, self.gateway.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayConfig, HttpGateway};
    use crate::models::NodeError;

    /// Real HTTP gateway; only used where the service fails before any request
    fn offline_service() -> SyncService {
        let config = GatewayConfig::new("https://criptapp.org/api", "token");
        let gateway = HttpGateway::new(&config).unwrap();
        SyncService::with_context(Arc::new(gateway), ValidationContext::detached())
    }

    #[test]
    fn test_save_rejects_secondary_before_any_request() {
        let service = offline_service();
        let mut property = Node::builder("Property")
            .set("key", "modulus")
            .build()
            .unwrap();
        let result = tokio_test::block_on(service.save(&mut property));
        assert_eq!(
            result,
            Err(SyncError::not_persistable("Property", "saved"))
        );
    }

    #[test]
    fn test_get_checks_url_before_fetching() {
        let service = offline_service();
        let err = tokio_test::block_on(service.get("https://elsewhere.org/api/material/1/"))
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidUrl { .. }));
        let err = tokio_test::block_on(service.get("https://criptapp.org/api/widget/1/"))
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidUrl { .. }));
    }

    #[test]
    fn test_search_unknown_type() {
        let service = offline_service();
        let err = tokio_test::block_on(service.search("Widget", &[])).unwrap_err();
        assert_eq!(
            err,
            SyncError::Node(NodeError::UnknownNodeType("Widget".to_string()))
        );
    }

    #[test]
    fn test_query_string_joins_pairs_without_escaping() {
        assert_eq!(query_string(&[]), "");
        assert_eq!(
            query_string(&[("name", "poly styrene"), ("public", "true")]),
            "name=poly styrene&public=true"
        );
    }

    #[test]
    fn test_save_outcome_is_saved() {
        assert!(SaveOutcome::Created.is_saved());
        assert!(!SaveOutcome::Rejected {
            status: 400,
            body: Value::Null
        }
        .is_saved());
    }
}
