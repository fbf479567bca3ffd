//! Node References
//!
//! A reference field or collection element holds one of three shapes:
//!
//! - a live in-memory [`Node`]
//! - a remote identifier (URL string) naming an existing primary node
//! - a raw JSON mapping not yet materialized into a node
//!
//! Raw mappings are transient: assigning them into a node materializes them
//! through the field's reference target.

use crate::models::Node;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// Live in-memory node
    Node(Box<Node>),
    /// URL of an existing remote primary node
    Remote(String),
    /// Unmaterialized JSON mapping
    Raw(Map<String, Value>),
}

impl Reference {
    /// The live node, if resolved
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// URL identifying the target, when known
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Node(node) => node.url(),
            Self::Remote(url) => Some(url),
            Self::Raw(map) => map.get("url").and_then(Value::as_str),
        }
    }

    /// Short description for error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Node(node) => node.type_name().to_string(),
            Self::Remote(url) => format!("remote {url}"),
            Self::Raw(_) => "raw object".to_string(),
        }
    }
}

impl From<Node> for Reference {
    fn from(node: Node) -> Self {
        Self::Node(Box::new(node))
    }
}

impl From<&str> for Reference {
    fn from(url: &str) -> Self {
        Self::Remote(url.to_string())
    }
}

impl From<String> for Reference {
    fn from(url: String) -> Self {
        Self::Remote(url)
    }
}

impl From<Map<String, Value>> for Reference {
    fn from(map: Map<String, Value>) -> Self {
        Self::Raw(map)
    }
}
