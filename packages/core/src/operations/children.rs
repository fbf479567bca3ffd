//! Collection Mutation
//!
//! `add_child` and `remove_child` on a node's collection fields. Collections
//! are ordered and append-only: no dedup, no sorting. Routed collections
//! (e.g. a procedure's `ingredients`) dispatch to the real collection chosen
//! by the child's concrete type.

use crate::models::schema::RefTarget;
use crate::models::{Node, NodeError, Reference};
use crate::resolver;

/// Which child to remove from a collection
#[derive(Debug, Clone, Copy)]
pub enum ChildSelector<'a> {
    /// Position in the collection
    Index(usize),
    /// Primary children match by URL, secondary children by deep equality
    Node(&'a Node),
    /// Child whose URL equals this one
    Url(&'a str),
}

impl From<usize> for ChildSelector<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<'a> From<&'a Node> for ChildSelector<'a> {
    fn from(node: &'a Node) -> Self {
        Self::Node(node)
    }
}

impl<'a> From<&'a str> for ChildSelector<'a> {
    fn from(url: &'a str) -> Self {
        Self::Url(url)
    }
}

impl ChildSelector<'_> {
    fn describe(&self) -> String {
        match self {
            Self::Index(index) => format!("child at index {index}"),
            Self::Node(node) => match (node.url(), node.label()) {
                (Some(url), _) => format!("{} {}", node.type_name(), url),
                (None, Some(label)) => format!("{} '{}'", node.type_name(), label),
                (None, None) => node.type_name().to_string(),
            },
            Self::Url(url) => format!("node {url}"),
        }
    }
}

fn reject_unsaved(reference: &Reference) -> Result<(), NodeError> {
    match reference.as_node() {
        Some(node) if node.is_primary() && !node.is_saved() => Err(node.unsaved_error()),
        _ => Ok(()),
    }
}

impl Node {
    /// Real collection and target for a (possibly routed) collection name
    fn collection_target(&self, collection: &str) -> Result<&'static RefTarget, NodeError> {
        let schema = self.schema();
        if let Some(routed) = schema.routed_collection(collection) {
            return Ok(&routed.target);
        }
        schema
            .collection(collection)
            .and_then(|spec| spec.field_type.target())
            .ok_or_else(|| NodeError::invalid_collection(self.type_name(), collection))
    }

    /// Append `child` to `collection`
    ///
    /// `child` may be a live node, a URL, or a raw mapping (materialized via
    /// the collection's discriminator first). On error the collection is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// - `UnsavedNode` if the child is a primary node without a URL, checked
    ///   before anything else
    /// - `InvalidCollection` if this type has no such collection
    /// - `TypeMismatch` if the child's type is not accepted
    pub fn add_child(
        &mut self,
        collection: &str,
        child: impl Into<Reference>,
    ) -> Result<(), NodeError> {
        let child = child.into();
        reject_unsaved(&child)?;

        let target = self.collection_target(collection)?;
        let child = resolver::normalize(collection, child, target)?;
        reject_unsaved(&child)?;

        let destination = match self.schema().routed_collection(collection) {
            Some(routed) => {
                let type_name = child.as_node().map(Node::type_name).unwrap_or_default();
                routed.route_for(type_name).ok_or_else(|| {
                    NodeError::type_mismatch(collection, routed.target.describe(), child.describe())
                })?
            }
            None => self
                .schema()
                .collection(collection)
                .map(|spec| spec.name)
                .ok_or_else(|| NodeError::invalid_collection(self.type_name(), collection))?,
        };

        let type_name = self.type_name();
        self.children_mut(destination)
            .ok_or_else(|| NodeError::invalid_collection(type_name, destination))?
            .push(child);
        Ok(())
    }

    /// Remove and return one child of `collection`
    ///
    /// # Errors
    ///
    /// - `InvalidCollection` if this type has no such collection
    /// - `IndexOutOfRange` for an index past the end
    /// - `AmbiguousIndex` for an index into a routed collection
    /// - `NodeNotFound` if no child matches (including an unsaved primary
    ///   selector, which cannot match by URL)
    pub fn remove_child<'a>(
        &mut self,
        collection: &str,
        selector: impl Into<ChildSelector<'a>>,
    ) -> Result<Reference, NodeError> {
        let selector = selector.into();
        let schema = self.schema();

        let candidates: Vec<&'static str> = match schema.routed_collection(collection) {
            Some(routed) => {
                if let ChildSelector::Index(_) = selector {
                    return Err(NodeError::AmbiguousIndex {
                        collection: collection.to_string(),
                    });
                }
                match selector {
                    ChildSelector::Node(node) => routed
                        .route_for(node.type_name())
                        .into_iter()
                        .collect(),
                    _ => routed.routes.iter().map(|(_, real)| *real).collect(),
                }
            }
            None => vec![schema
                .collection(collection)
                .map(|spec| spec.name)
                .ok_or_else(|| NodeError::invalid_collection(self.type_name(), collection))?],
        };

        for name in candidates {
            let Some(children) = self.children_mut(name) else {
                continue;
            };
            let position = match selector {
                ChildSelector::Index(index) => {
                    if index >= children.len() {
                        return Err(NodeError::IndexOutOfRange {
                            collection: collection.to_string(),
                            index,
                            len: children.len(),
                        });
                    }
                    Some(index)
                }
                ChildSelector::Node(node) if node.is_primary() => match node.url() {
                    Some(url) => children.iter().position(|c| c.url() == Some(url)),
                    None => None,
                },
                ChildSelector::Node(node) => children
                    .iter()
                    .position(|c| c.as_node().is_some_and(|existing| existing == node)),
                ChildSelector::Url(url) => children.iter().position(|c| c.url() == Some(url)),
            };
            if let Some(position) = position {
                return Ok(children.remove(position));
            }
        }

        Err(NodeError::node_not_found(collection, selector.describe()))
    }
}

#[cfg(test)]
#[path = "children_test.rs"]
mod children_test;
