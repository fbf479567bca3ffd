//! Reference Resolver
//!
//! Brings whatever a reference field was given into one resolved form:
//!
//! - [`normalize`] - validate a live node's type, keep a URL as a remote
//!   reference, materialize a raw mapping through the field's discriminator
//! - [`materialize`] - turn a raw mapping into a typed [`Node`]
//! - [`dereference`] - fetch a remote reference through the gateway
//!
//! The resolver is stateless. Normalizing never touches the network; only
//! `dereference` does, and it never writes the fetched node back into a field.

use crate::gateway::SyncGateway;
use crate::models::schema::RefTarget;
use crate::models::{registry, Node, NodeError, Reference, URL_FIELD};
use crate::services::SyncError;
use serde_json::{Map, Value};

/// Normalize `reference` for a field accepting `target`
///
/// # Errors
///
/// `TypeMismatch` when a node's type is not accepted, when a URL is given for
/// a field that only holds embedded nodes (or names a type the field does not
/// accept), or when a raw mapping carries no discriminating key.
pub fn normalize(
    field: &str,
    reference: Reference,
    target: &RefTarget,
) -> Result<Reference, NodeError> {
    match reference {
        Reference::Node(node) => {
            if target.accepts(node.type_name()) {
                Ok(Reference::Node(node))
            } else {
                Err(NodeError::type_mismatch(
                    field,
                    target.describe(),
                    node.type_name(),
                ))
            }
        }
        Reference::Remote(url) => {
            check_remote(field, &url, target)?;
            Ok(Reference::Remote(url))
        }
        Reference::Raw(map) => {
            if let Some(url) = bare_url(&map) {
                check_remote(field, url, target)?;
                return Ok(Reference::Remote(url.to_string()));
            }
            materialize(field, &map, target).map(Reference::from)
        }
    }
}

fn check_remote(field: &str, url: &str, target: &RefTarget) -> Result<(), NodeError> {
    let addressable = target
        .allowed
        .iter()
        .any(|t| registry().get(t).is_some_and(|s| s.is_primary()));
    if !addressable {
        return Err(NodeError::type_mismatch(
            field,
            target.describe(),
            format!("remote {url}"),
        ));
    }
    // URLs with an unrecognized slug are kept as-is; only a known wrong type is rejected
    if let Some(schema) = registry().for_url(url) {
        if !target.accepts(schema.type_name) {
            return Err(NodeError::type_mismatch(
                field,
                target.describe(),
                schema.type_name,
            ));
        }
    }
    Ok(())
}

/// `{"url": "..."}` with nothing else is a remote reference in disguise
fn bare_url(map: &Map<String, Value>) -> Option<&str> {
    if map.len() == 1 {
        map.get(URL_FIELD).and_then(Value::as_str)
    } else {
        None
    }
}

/// Materialize a raw mapping as the type its discriminator selects
pub fn materialize(
    field: &str,
    payload: &Map<String, Value>,
    target: &RefTarget,
) -> Result<Node, NodeError> {
    let type_name = target.discriminator.select(payload).ok_or_else(|| {
        NodeError::type_mismatch(
            field,
            target.describe(),
            "object without a discriminating key",
        )
    })?;
    Node::from_payload(type_name, payload)
}

/// Resolve a reference into a full node, fetching remote references
///
/// The type of a remote node is inferred from its URL slug.
///
/// # Errors
///
/// - `SyncError::InvalidUrl` if the URL names no registered primary type
/// - gateway failures, unmodified
/// - node construction errors from the fetched payload
pub async fn dereference(
    reference: &Reference,
    gateway: &dyn SyncGateway,
) -> Result<Node, SyncError> {
    match reference {
        Reference::Node(node) => Ok((**node).clone()),
        Reference::Remote(url) => {
            let schema = registry()
                .for_url(url)
                .ok_or_else(|| SyncError::invalid_url(url.as_str(), "no node type for URL"))?;
            tracing::debug!(url = url.as_str(), node_type = schema.type_name, "Dereferencing");
            let payload = gateway.fetch(url).await?;
            Ok(Node::from_payload(schema.type_name, &payload)?)
        }
        Reference::Raw(map) => {
            let url = map
                .get(URL_FIELD)
                .and_then(Value::as_str)
                .ok_or_else(|| SyncError::invalid_url("", "raw object has no url"))?;
            let schema = registry()
                .for_url(url)
                .ok_or_else(|| SyncError::invalid_url(url, "no node type for URL"))?;
            Ok(Node::from_payload(schema.type_name, map)?)
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;
