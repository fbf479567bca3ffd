//! Applying Remote State
//!
//! Overwrites a node's fields with the authoritative record returned by the
//! server after a save or fetch.

use crate::models::node::{convert_input, parse_timestamp, FieldInput};
use crate::models::{
    FieldValue, Node, NodeError, Reference, CREATED_AT_FIELD, UPDATED_AT_FIELD, URL_FIELD,
};
use serde_json::{Map, Value};

impl Node {
    /// Apply a server record onto this node in place
    ///
    /// Per key:
    /// - `url`, `created_at` and `updated_at` set the node's identity
    /// - a string containing `base_url` under any other key is a link echoed
    ///   back by the server and is ignored
    /// - if the field currently holds a live node and the incoming value is a
    ///   mapping, the nested node is updated recursively, keeping local state
    ///   the server did not send
    /// - keys the type does not declare are ignored
    /// - a value that does not fit its field is skipped, keeping the old value
    /// - anything else overwrites the field
    ///
    /// Only a malformed timestamp is an error; on error the node is left
    /// unchanged.
    pub fn apply_remote_state(
        &mut self,
        payload: &Map<String, Value>,
        base_url: &str,
    ) -> Result<(), NodeError> {
        let mut staged = self.clone();
        staged.apply_remote_in_place(payload, base_url)?;
        *self = staged;
        Ok(())
    }

    fn apply_remote_in_place(
        &mut self,
        payload: &Map<String, Value>,
        base_url: &str,
    ) -> Result<(), NodeError> {
        let schema = self.schema();

        for (key, incoming) in payload {
            match key.as_str() {
                URL_FIELD => {
                    if self.is_primary() {
                        self.url = incoming.as_str().map(str::to_string);
                    }
                    continue;
                }
                CREATED_AT_FIELD => {
                    self.created_at = parse_timestamp(key, incoming)?;
                    continue;
                }
                UPDATED_AT_FIELD => {
                    self.updated_at = parse_timestamp(key, incoming)?;
                    continue;
                }
                _ => {}
            }

            if let Value::String(text) = incoming {
                if !base_url.is_empty() && text.contains(base_url) {
                    tracing::debug!(
                        node_type = schema.type_name,
                        field = key.as_str(),
                        "Ignoring echoed service link"
                    );
                    continue;
                }
            }

            let Some(spec) = schema.field(key) else {
                tracing::debug!(
                    node_type = schema.type_name,
                    field = key.as_str(),
                    "Ignoring undeclared field in remote record"
                );
                continue;
            };

            if let (
                Some(FieldValue::Reference(Some(Reference::Node(nested)))),
                Value::Object(record),
            ) = (self.fields.get_mut(spec.name), incoming)
            {
                nested.apply_remote_in_place(record, base_url)?;
                continue;
            }

            match convert_input(spec, FieldInput::Value(incoming.clone())) {
                Ok(value) => {
                    self.fields.insert(spec.name, value);
                }
                Err(error) => {
                    tracing::debug!(
                        node_type = schema.type_name,
                        field = key.as_str(),
                        %error,
                        "Skipping mistyped field in remote record"
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "remote_state_test.rs"]
mod remote_state_test;
