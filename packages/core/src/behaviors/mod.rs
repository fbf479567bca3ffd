//! Node Capabilities
//!
//! Small capability traits a node type implements explicitly:
//!
//! - `Serializable` - lowering to the upload payload and JSON text
//! - `Validatable` - required-field and vocabulary checks
//! - `Printable` - human-readable JSON, also backing `Display`
//!
//! `Node` implements all three by delegating to its inherent operations; the
//! typed wrappers delegate to the node they wrap.

use crate::models::{MaterialNode, Node, NodeError, ProcedureNode};
use crate::validation::ValidationContext;
use serde_json::{Map, Value};

pub trait Serializable {
    /// Upload payload; fails on unsaved primary references
    fn prepare_for_transmission(&self) -> Result<Map<String, Value>, NodeError>;

    /// Compact JSON text of the upload payload
    fn to_json(&self) -> Result<String, NodeError> {
        let payload = Value::Object(self.prepare_for_transmission()?);
        serde_json::to_string(&payload).map_err(|e| NodeError::Serialization(e.to_string()))
    }
}

pub trait Validatable {
    fn validate_required(&self) -> Result<(), NodeError>;

    /// Canonicalize vocabulary-bound fields; leaves the node unchanged on error
    fn validate_vocabulary(&mut self, ctx: &ValidationContext) -> Result<(), NodeError>;
}

pub trait Printable: Serializable {
    fn to_pretty_json(&self) -> Result<String, NodeError> {
        let payload = Value::Object(self.prepare_for_transmission()?);
        serde_json::to_string_pretty(&payload).map_err(|e| NodeError::Serialization(e.to_string()))
    }
}

impl Serializable for Node {
    fn prepare_for_transmission(&self) -> Result<Map<String, Value>, NodeError> {
        Node::prepare_for_transmission(self)
    }
}

impl Validatable for Node {
    fn validate_required(&self) -> Result<(), NodeError> {
        Node::validate_required(self)
    }

    fn validate_vocabulary(&mut self, ctx: &ValidationContext) -> Result<(), NodeError> {
        Node::validate_vocabulary(self, ctx)
    }
}

impl Printable for Node {}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_pretty_json() {
            Ok(json) => f.write_str(&json),
            // unsaved references cannot be lowered; fall back to a summary
            Err(e) => write!(f, "<{} ({})>", self.type_name(), e),
        }
    }
}

macro_rules! delegate_capabilities {
    ($($wrapper:ty),*) => {$(
        impl Serializable for $wrapper {
            fn prepare_for_transmission(&self) -> Result<Map<String, Value>, NodeError> {
                self.as_node().prepare_for_transmission()
            }
        }

        impl Validatable for $wrapper {
            fn validate_required(&self) -> Result<(), NodeError> {
                self.as_node().validate_required()
            }

            fn validate_vocabulary(&mut self, ctx: &ValidationContext) -> Result<(), NodeError> {
                self.as_node_mut().validate_vocabulary(ctx)
            }
        }

        impl Printable for $wrapper {}
    )*};
}

delegate_capabilities!(MaterialNode, ProcedureNode);

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP: &str = "https://criptapp.org/api/group/1/";

    #[test]
    fn test_display_prints_pretty_payload() {
        let node = Node::builder("Group")
            .set("name", "lab")
            .url(GROUP)
            .build()
            .unwrap();
        let printed = node.to_string();
        assert!(printed.contains("\"name\": \"lab\""));
        assert!(printed.contains(GROUP));
    }

    #[test]
    fn test_display_falls_back_for_unsaved_references() {
        let identity = Node::builder("Identity")
            .set("group", GROUP)
            .set("name", "styrene")
            .build()
            .unwrap();
        let component = Node::builder("MaterialComponent")
            .link("component", identity)
            .build()
            .unwrap();
        assert!(component.to_string().starts_with("<MaterialComponent"));
    }

    #[test]
    fn test_wrappers_delegate() {
        let procedure = ProcedureNode::new(3).unwrap();
        let json = Serializable::to_json(&procedure).unwrap();
        assert!(json.contains("\"procedure_id\":3"));
        assert!(Validatable::validate_required(&procedure).is_ok());
    }
}
