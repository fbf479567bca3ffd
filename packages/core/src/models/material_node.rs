//! Material Node Wrapper
//!
//! Type-checked accessors over a universal `Node` of type `Material`.
//!
//! # Examples
//!
//! ```rust
//! use cript_core::models::MaterialNode;
//!
//! let material = MaterialNode::builder("polystyrene", "https://criptapp.org/api/group/1/")
//!     .build()?;
//! assert_eq!(material.name(), Some("polystyrene"));
//! assert!(material.properties().is_empty());
//! # Ok::<(), cript_core::models::NodeError>(())
//! ```

use crate::models::{Node, NodeBuilder, NodeError, Reference};
use crate::operations::ChildSelector;

pub const MATERIAL_TYPE: &str = "Material";

/// Typed view of a Material node
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialNode {
    node: Node,
}

impl MaterialNode {
    /// Wrap a universal Node
    ///
    /// # Errors
    ///
    /// Returns `NodeError::TypeMismatch` if the node is not a Material.
    pub fn from_node(node: Node) -> Result<Self, NodeError> {
        if node.type_name() != MATERIAL_TYPE {
            return Err(NodeError::type_mismatch(
                "node",
                MATERIAL_TYPE,
                node.type_name(),
            ));
        }
        Ok(Self { node })
    }

    pub fn as_node(&self) -> &Node {
        &self.node
    }

    pub fn as_node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn name(&self) -> Option<&str> {
        self.node.str_value("name")
    }

    /// Embedded property children
    pub fn properties(&self) -> &[Reference] {
        self.node.children("properties").unwrap_or_default()
    }

    pub fn components(&self) -> &[Reference] {
        self.node.children("components").unwrap_or_default()
    }

    pub fn add_property(&mut self, property: impl Into<Reference>) -> Result<(), NodeError> {
        self.node.add_child("properties", property)
    }

    pub fn remove_property<'a>(
        &mut self,
        selector: impl Into<ChildSelector<'a>>,
    ) -> Result<Reference, NodeError> {
        self.node.remove_child("properties", selector)
    }

    pub fn add_condition(&mut self, condition: impl Into<Reference>) -> Result<(), NodeError> {
        self.node.add_child("conditions", condition)
    }

    pub fn add_component(&mut self, component: impl Into<Reference>) -> Result<(), NodeError> {
        self.node.add_child("components", component)
    }

    pub fn add_citation(&mut self, citation: impl Into<Reference>) -> Result<(), NodeError> {
        self.node.add_child("citations", citation)
    }

    /// Start a Material owned by `group`
    pub fn builder(name: impl Into<String>, group: impl Into<Reference>) -> MaterialNodeBuilder {
        MaterialNodeBuilder {
            inner: Node::builder(MATERIAL_TYPE)
                .set("name", name.into())
                .link("group", group),
        }
    }
}

pub struct MaterialNodeBuilder {
    inner: NodeBuilder,
}

impl MaterialNodeBuilder {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.inner = self.inner.set("source", source.into());
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.inner = self.inner.set("keywords", keywords);
        self
    }

    pub fn with_property(mut self, property: impl Into<Reference>) -> Self {
        self.inner = self.inner.push("properties", property);
        self
    }

    pub fn build(self) -> Result<MaterialNode, NodeError> {
        MaterialNode::from_node(self.inner.build()?)
    }
}
