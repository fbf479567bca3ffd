//! Data Models
//!
//! This module contains the client-side object model for CRIPT records:
//!
//! - `Node` - universal node model for every record type
//! - `NodeSchema` - declarative type definitions, registered by name and slug
//! - `Reference` - live node, remote URL, or raw payload held by a reference field
//! - Typed wrappers (`MaterialNode`, `ProcedureNode`) built on the Node foundation

pub mod core_schemas;
mod error;
mod material_node;
pub(crate) mod node;
mod procedure_node;
mod reference;
pub mod registry;
pub mod schema;

pub use error::NodeError;
pub use material_node::{MaterialNode, MaterialNodeBuilder, MATERIAL_TYPE};
pub use node::{
    FieldValue, Node, NodeBuilder, CREATED_AT_FIELD, UPDATED_AT_FIELD, URL_FIELD,
};
pub use procedure_node::{ProcedureNode, INGREDIENTS, PROCEDURE_TYPE};
pub use reference::Reference;
pub use registry::{registry, slug_from_url, NodeRegistry};
pub use schema::{NodeKind, NodeSchema};
