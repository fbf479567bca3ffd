//! Lowering for Transmission
//!
//! Produces the JSON payload sent to the server. The live graph is only read:
//! the output is built fresh, so nothing the caller holds is mutated.
//!
//! Rules per referenced node:
//! - primary with a URL: the bare URL string
//! - primary without a URL: the whole operation fails with `UnsavedNode`
//! - secondary: inlined by lowering it recursively
//!
//! Remote references lower to their URL; raw mappings are materialized
//! through the field's target first and then lowered like any node.

use crate::models::schema::{FieldType, RefTarget};
use crate::models::{
    FieldValue, Node, NodeError, Reference, CREATED_AT_FIELD, UPDATED_AT_FIELD, URL_FIELD,
};
use crate::resolver;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

fn timestamp_value(timestamp: Option<DateTime<Utc>>) -> Value {
    timestamp
        .map(|ts| Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
        .unwrap_or(Value::Null)
}

fn lower_reference(
    field: &str,
    reference: &Reference,
    target: &RefTarget,
) -> Result<Value, NodeError> {
    match reference {
        Reference::Node(node) => lower_node(node),
        Reference::Remote(url) => Ok(Value::String(url.clone())),
        Reference::Raw(map) => lower_node(&resolver::materialize(field, map, target)?),
    }
}

fn lower_node(node: &Node) -> Result<Value, NodeError> {
    if node.is_primary() {
        node.url()
            .map(|url| Value::String(url.to_string()))
            .ok_or_else(|| node.unsaved_error())
    } else {
        node.prepare_for_transmission().map(Value::Object)
    }
}

impl Node {
    /// Lower this node to a JSON-compatible mapping
    ///
    /// Primary nodes include `url`, `created_at` and `updated_at` (possibly
    /// `null`); every declared field is present, `null` values included.
    ///
    /// # Errors
    ///
    /// `UnsavedNode` naming the first primary node without a URL found
    /// anywhere in the embedded subgraph. No partial payload is produced.
    pub fn prepare_for_transmission(&self) -> Result<Map<String, Value>, NodeError> {
        let mut payload = Map::new();

        if self.is_primary() {
            payload.insert(
                URL_FIELD.to_string(),
                self.url().map(|u| Value::String(u.to_string())).unwrap_or(Value::Null),
            );
            payload.insert(CREATED_AT_FIELD.to_string(), timestamp_value(self.created_at()));
            payload.insert(UPDATED_AT_FIELD.to_string(), timestamp_value(self.updated_at()));
        }

        for spec in &self.schema().fields {
            let lowered = match (self.field(spec.name), &spec.field_type) {
                (Some(FieldValue::Value(value)), _) => value.clone(),
                (Some(FieldValue::Reference(Some(reference))), FieldType::Reference(target)) => {
                    lower_reference(spec.name, reference, target)?
                }
                (Some(FieldValue::Collection(children)), FieldType::Collection(target)) => {
                    Value::Array(
                        children
                            .iter()
                            .map(|child| lower_reference(spec.name, child, target))
                            .collect::<Result<Vec<_>, _>>()?,
                    )
                }
                (Some(FieldValue::Collection(_)), _) => Value::Array(Vec::new()),
                _ => Value::Null,
            };
            payload.insert(spec.name.to_string(), lowered);
        }

        Ok(payload)
    }
}

#[cfg(test)]
#[path = "lowering_test.rs"]
mod lowering_test;
