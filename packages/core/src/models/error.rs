//! Node Model Error Types
//!
//! Errors raised while constructing, mutating and lowering nodes. Vocabulary
//! failures from keyed fields are wrapped unchanged.

use crate::validation::ValidationError;
use thiserror::Error;

/// Node graph errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// One or more required fields are absent
    #[error("{type_name} is missing required fields: {}", fields.join(", "))]
    MissingRequiredFields {
        type_name: String,
        fields: Vec<String>,
    },

    /// A primary node without a URL was referenced, added or lowered
    #[error("Unsaved {type_name}{}: save it before linking to it", label.as_deref().map(|l| format!(" '{l}'")).unwrap_or_default())]
    UnsavedNode {
        type_name: String,
        label: Option<String>,
    },

    /// The node type has no collection by that name
    #[error("{type_name} has no collection named '{collection}'")]
    InvalidCollection {
        type_name: String,
        collection: String,
    },

    /// Removal target is not a member of the collection
    #[error("No {target} in collection '{collection}'")]
    NodeNotFound { collection: String, target: String },

    /// Removal index past the end of the collection
    #[error("Index {index} out of range for collection '{collection}' of length {len}")]
    IndexOutOfRange {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Removal by index from a collection that spans several real collections
    #[error("Collection '{collection}' is routed by child type; remove by node instead of index")]
    AmbiguousIndex { collection: String },

    /// A value or node does not fit the field's declared type
    #[error("Field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// The node type declares no such field
    #[error("{type_name} has no field named '{field}'")]
    UnknownField { type_name: String, field: String },

    /// No schema is registered under that type name or slug
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Two schemas claim the same type name or slug
    #[error("Duplicate schema registration: {0}")]
    DuplicateSchema(String),

    /// A timestamp field could not be parsed as RFC 3339
    #[error("Invalid timestamp for '{field}': {value}")]
    InvalidTimestamp { field: String, value: String },

    /// Serialization of a lowered payload failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Keyed field rejected by the vocabulary
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl NodeError {
    /// Create a missing required fields error
    pub fn missing_required(type_name: impl Into<String>, fields: Vec<String>) -> Self {
        Self::MissingRequiredFields {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Create an unsaved node error
    pub fn unsaved(type_name: impl Into<String>, label: Option<String>) -> Self {
        Self::UnsavedNode {
            type_name: type_name.into(),
            label,
        }
    }

    /// Create an invalid collection error
    pub fn invalid_collection(type_name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::InvalidCollection {
            type_name: type_name.into(),
            collection: collection.into(),
        }
    }

    /// Create a node not found error
    pub fn node_not_found(collection: impl Into<String>, target: impl Into<String>) -> Self {
        Self::NodeNotFound {
            collection: collection.into(),
            target: target.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// Create an invalid timestamp error
    pub fn invalid_timestamp(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            field: field.into(),
            value: value.into(),
        }
    }
}
