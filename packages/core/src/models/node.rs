//! Node Data Structures
//!
//! This module defines the universal `Node` struct used for every CRIPT record
//! type, and the builder used to construct it.
//!
//! # Architecture
//!
//! - **Universal Node**: one struct represents all record types; the type's
//!   [`NodeSchema`] decides which fields exist and what they hold
//! - **Primary vs Secondary**: primary nodes carry `url` and timestamps once
//!   saved; secondary nodes are always embedded in their owner
//! - **References**: reference and collection fields hold [`Reference`]s,
//!   normalized against the field's declared target on assignment
//!
//! # Examples
//!
//! ```rust
//! use cript_core::models::Node;
//!
//! let group = Node::builder("Group")
//!     .set("name", "polymer-lab")
//!     .url("https://criptapp.org/api/group/1/")
//!     .build()
//!     .unwrap();
//!
//! let material = Node::builder("Material")
//!     .set("name", "polystyrene")
//!     .link("group", group)
//!     .build()
//!     .unwrap();
//!
//! assert!(material.is_primary());
//! assert!(!material.is_saved());
//! ```

use crate::models::registry::registry;
use crate::models::schema::{FieldSpec, FieldType, NodeKind, NodeSchema};
use crate::models::{NodeError, Reference};
use crate::resolver;
use crate::validation::{validate_key, validate_unit, validate_value, ValidationContext};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Identity field of primary nodes
pub const URL_FIELD: &str = "url";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Current value of one node field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Scalar or list of scalars
    Value(Value),
    /// Single reference, `None` when unset
    Reference(Option<Reference>),
    /// Ordered child collection
    Collection(Vec<Reference>),
}

/// Input accepted for a field before normalization
#[derive(Debug, Clone)]
pub(crate) enum FieldInput {
    Value(Value),
    Reference(Reference),
    References(Vec<Reference>),
}

impl FieldInput {
    fn is_empty(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }
}

/// Universal node for every record type
///
/// Fields follow the declaration order of the type's schema. Equality is
/// deep value equality over type, identity, timestamps and all fields.
#[derive(Clone)]
pub struct Node {
    pub(crate) schema: &'static NodeSchema,
    pub(crate) url: Option<String>,
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
    pub(crate) fields: BTreeMap<&'static str, FieldValue>,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("type", &self.schema.type_name)
            .field("url", &self.url)
            .field("fields", &self.fields)
            .finish()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.schema.type_name == other.schema.type_name
            && self.url == other.url
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
            && self.fields == other.fields
    }
}

/// Short JSON type name for error messages
pub(crate) fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn reference_from_value(field: &str, value: Value) -> Result<Reference, NodeError> {
    match value {
        Value::String(url) => Ok(Reference::Remote(url)),
        Value::Object(map) => Ok(Reference::Raw(map)),
        other => Err(NodeError::type_mismatch(
            field,
            "node, URL or object",
            describe_value(&other),
        )),
    }
}

/// Convert an input into the stored form for `spec`
pub(crate) fn convert_input(spec: &FieldSpec, input: FieldInput) -> Result<FieldValue, NodeError> {
    let field = spec.name;
    match (&spec.field_type, input) {
        (FieldType::Reference(_), FieldInput::Value(Value::Null)) => Ok(FieldValue::Reference(None)),
        (FieldType::Reference(target), FieldInput::Value(value)) => {
            let reference = reference_from_value(field, value)?;
            Ok(FieldValue::Reference(Some(resolver::normalize(
                field, reference, target,
            )?)))
        }
        (FieldType::Reference(target), FieldInput::Reference(reference)) => Ok(
            FieldValue::Reference(Some(resolver::normalize(field, reference, target)?)),
        ),
        (FieldType::Collection(_), FieldInput::Value(Value::Null)) => {
            Ok(FieldValue::Collection(Vec::new()))
        }
        (FieldType::Collection(target), FieldInput::Value(Value::Array(items))) => items
            .into_iter()
            .map(|item| {
                reference_from_value(field, item)
                    .and_then(|reference| resolver::normalize(field, reference, target))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::Collection),
        (FieldType::Collection(target), FieldInput::Reference(reference)) => Ok(
            FieldValue::Collection(vec![resolver::normalize(field, reference, target)?]),
        ),
        (FieldType::Collection(target), FieldInput::References(references)) => references
            .into_iter()
            .map(|reference| resolver::normalize(field, reference, target))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::Collection),
        (field_type @ FieldType::Collection(_), FieldInput::Value(other)) => Err(
            NodeError::type_mismatch(field, field_type.describe(), describe_value(&other)),
        ),
        (field_type, FieldInput::Value(value)) => {
            if field_type.accepts_value(&value) {
                Ok(FieldValue::Value(value))
            } else {
                Err(NodeError::type_mismatch(
                    field,
                    field_type.describe(),
                    describe_value(&value),
                ))
            }
        }
        (field_type, FieldInput::Reference(reference)) => Err(NodeError::type_mismatch(
            field,
            field_type.describe(),
            reference.describe(),
        )),
        (field_type, FieldInput::References(_)) => Err(NodeError::type_mismatch(
            field,
            field_type.describe(),
            "list of nodes",
        )),
    }
}

fn default_value(spec: &FieldSpec) -> FieldValue {
    match spec.field_type {
        FieldType::Reference(_) => FieldValue::Reference(None),
        FieldType::Collection(_) => FieldValue::Collection(Vec::new()),
        _ => FieldValue::Value(spec.default.clone().unwrap_or(Value::Null)),
    }
}

/// Parse an RFC 3339 timestamp field; `null` means absent
pub(crate) fn parse_timestamp(
    field: &str,
    value: &Value,
) -> Result<Option<DateTime<Utc>>, NodeError> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| Some(ts.with_timezone(&Utc)))
            .map_err(|_| NodeError::invalid_timestamp(field, raw.as_str())),
        other => Err(NodeError::invalid_timestamp(field, other.to_string())),
    }
}

impl Node {
    /// Start building a node of the registered type `type_name`
    pub fn builder(type_name: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(type_name)
    }

    /// Materialize a node from a wire payload
    ///
    /// `url`, `created_at` and `updated_at` are split out of the field map;
    /// keys the type does not declare are ignored.
    pub fn from_payload(type_name: &str, payload: &Map<String, Value>) -> Result<Self, NodeError> {
        let schema = registry().require(type_name)?;
        let mut builder = NodeBuilder::new(type_name);

        for (key, value) in payload {
            match key.as_str() {
                URL_FIELD => builder.url = value.as_str().map(str::to_string),
                CREATED_AT_FIELD => builder.created_at = parse_timestamp(key, value)?,
                UPDATED_AT_FIELD => builder.updated_at = parse_timestamp(key, value)?,
                _ if schema.field(key).is_some() => builder = builder.set(key, value.clone()),
                _ => tracing::debug!(
                    node_type = type_name,
                    field = key.as_str(),
                    "Ignoring undeclared field in payload"
                ),
            }
        }

        builder.build()
    }

    pub fn schema(&self) -> &'static NodeSchema {
        self.schema
    }

    pub fn type_name(&self) -> &'static str {
        self.schema.type_name
    }

    pub fn kind(&self) -> NodeKind {
        self.schema.kind
    }

    pub fn is_primary(&self) -> bool {
        self.schema.is_primary()
    }

    /// Server-assigned URL; `None` until saved
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Whether the node has been persisted
    pub fn is_saved(&self) -> bool {
        self.url.is_some()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Raw field state by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Scalar field value
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name)? {
            FieldValue::Value(value) if !value.is_null() => Some(value),
            _ => None,
        }
    }

    /// String field value
    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    /// Single reference field value
    pub fn reference(&self, name: &str) -> Option<&Reference> {
        match self.fields.get(name)? {
            FieldValue::Reference(reference) => reference.as_ref(),
            _ => None,
        }
    }

    /// Children of a collection field
    pub fn children(&self, name: &str) -> Option<&[Reference]> {
        match self.fields.get(name)? {
            FieldValue::Collection(children) => Some(children),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self, name: &str) -> Option<&mut Vec<Reference>> {
        match self.fields.get_mut(name)? {
            FieldValue::Collection(children) => Some(children),
            _ => None,
        }
    }

    /// Human label used in error messages (`name`, else `key`)
    pub fn label(&self) -> Option<String> {
        self.str_value("name")
            .or_else(|| self.str_value("key"))
            .map(str::to_string)
    }

    /// Error describing this node as unsaved
    pub(crate) fn unsaved_error(&self) -> NodeError {
        NodeError::unsaved(self.type_name(), self.label())
    }

    /// Assign a field, running any vocabulary validation bound to it
    ///
    /// Keyed fields store the validator's canonical result: the key field
    /// stores the vocabulary spelling, and a value the vocabulary discards is
    /// stored as `null`. On error the node is left unchanged.
    ///
    /// # Errors
    ///
    /// - `UnknownField` if the type declares no such field
    /// - `MissingRequiredFields` when clearing a required field
    /// - `TypeMismatch` if the value does not fit the field
    /// - `Validation` for vocabulary failures
    pub fn set_field(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        ctx: &ValidationContext,
    ) -> Result<(), NodeError> {
        let spec = self
            .schema
            .field(name)
            .ok_or_else(|| NodeError::unknown_field(self.type_name(), name))?;
        let value = value.into();
        if spec.required && value.is_null() {
            return Err(NodeError::missing_required(
                self.type_name(),
                vec![spec.name.to_string()],
            ));
        }
        if spec.field_type.target().is_none() && !spec.field_type.accepts_value(&value) {
            return Err(NodeError::type_mismatch(
                spec.name,
                spec.field_type.describe(),
                describe_value(&value),
            ));
        }

        let value = self.validate_assignment(spec, value, ctx)?;
        let stored = convert_input(spec, FieldInput::Value(value))?;
        self.fields.insert(spec.name, stored);
        Ok(())
    }

    /// Point a single reference field at a node, URL or raw mapping
    pub fn set_reference(
        &mut self,
        name: &str,
        reference: impl Into<Reference>,
    ) -> Result<(), NodeError> {
        let spec = self
            .schema
            .field(name)
            .ok_or_else(|| NodeError::unknown_field(self.type_name(), name))?;
        if !matches!(spec.field_type, FieldType::Reference(_)) {
            return Err(NodeError::type_mismatch(
                spec.name,
                spec.field_type.describe(),
                "single reference",
            ));
        }
        let stored = convert_input(spec, FieldInput::Reference(reference.into()))?;
        self.fields.insert(spec.name, stored);
        Ok(())
    }

    fn validate_assignment(
        &self,
        spec: &FieldSpec,
        value: Value,
        ctx: &ValidationContext,
    ) -> Result<Value, NodeError> {
        if let Some(keyed) = &self.schema.keyed {
            let category = keyed.category;
            let current_key = self.str_value(keyed.key).unwrap_or_default();

            if spec.name == keyed.key {
                return match value.as_str() {
                    Some(key) => Ok(Value::String(validate_key(ctx, category, key)?)),
                    None => Ok(value),
                };
            }
            if spec.name == keyed.unit {
                let unit = validate_unit(ctx, category, current_key, value.as_str())?;
                return Ok(unit.map(Value::String).unwrap_or(Value::Null));
            }
            if spec.name == keyed.value {
                let unit = self.str_value(keyed.unit);
                let value = validate_value(ctx, category, current_key, Some(&value), unit)?;
                return Ok(value.unwrap_or(Value::Null));
            }
        }

        match (spec.vocabulary, value) {
            (Some(category), Value::String(key)) => {
                Ok(Value::String(validate_key(ctx, category, &key)?))
            }
            (Some(category), Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(key) => validate_key(ctx, category, &key).map(Value::String),
                    other => Ok(other),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
                .map_err(NodeError::from),
            (_, value) => Ok(value),
        }
    }

    /// Check that every required field holds a value
    ///
    /// Reports all missing fields at once.
    pub fn validate_required(&self) -> Result<(), NodeError> {
        let missing: Vec<String> = self
            .schema
            .required_fields()
            .filter(|name| match self.fields.get(name) {
                Some(FieldValue::Value(value)) => value.is_null(),
                Some(FieldValue::Reference(reference)) => reference.is_none(),
                Some(FieldValue::Collection(_)) => false,
                None => true,
            })
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(NodeError::missing_required(self.type_name(), missing))
        }
    }

    /// Re-validate every vocabulary-bound field, canonicalizing in place
    ///
    /// Keyed triples are checked key first, then unit, then value. Embedded
    /// secondary children are validated recursively; referenced primary nodes
    /// are not. On error the node is left unchanged.
    pub fn validate_vocabulary(&mut self, ctx: &ValidationContext) -> Result<(), NodeError> {
        let mut staged = self.clone();
        staged.validate_vocabulary_in_place(ctx)?;
        *self = staged;
        Ok(())
    }

    fn validate_vocabulary_in_place(&mut self, ctx: &ValidationContext) -> Result<(), NodeError> {
        let schema = self.schema;

        if let Some(keyed) = &schema.keyed {
            let key = match self.str_value(keyed.key) {
                Some(key) => validate_key(ctx, keyed.category, key)?,
                None => String::new(),
            };
            let unit = validate_unit(ctx, keyed.category, &key, self.str_value(keyed.unit))?;
            let value = validate_value(
                ctx,
                keyed.category,
                &key,
                self.value(keyed.value),
                unit.as_deref(),
            )?;

            if !key.is_empty() {
                self.fields.insert(keyed.key, FieldValue::Value(Value::String(key)));
            }
            self.fields.insert(
                keyed.unit,
                FieldValue::Value(unit.map(Value::String).unwrap_or(Value::Null)),
            );
            self.fields
                .insert(keyed.value, FieldValue::Value(value.unwrap_or(Value::Null)));
        }

        for spec in schema.fields.iter().filter(|f| f.vocabulary.is_some()) {
            if let Some(value) = self.value(spec.name).cloned() {
                let canonical = self.validate_assignment(spec, value, ctx)?;
                self.fields.insert(spec.name, FieldValue::Value(canonical));
            }
        }

        for field in self.fields.values_mut() {
            let children: Vec<&mut Reference> = match field {
                FieldValue::Reference(Some(reference)) => vec![reference],
                FieldValue::Collection(children) => children.iter_mut().collect(),
                _ => Vec::new(),
            };
            for child in children {
                if let Some(node) = child.as_node_mut().filter(|n| !n.is_primary()) {
                    node.validate_vocabulary_in_place(ctx)?;
                }
            }
        }

        Ok(())
    }
}

/// Builder for [`Node`]
///
/// Inputs are checked when [`NodeBuilder::build`] runs: unknown fields and
/// types fail first, then every missing required field is reported together,
/// then each value is type-checked and references are normalized.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    type_name: String,
    inputs: Vec<(String, FieldInput)>,
    url: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl NodeBuilder {
    fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            inputs: Vec::new(),
            url: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Set a field from a JSON value (scalars, URLs, raw mappings, lists)
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.push((name.into(), FieldInput::Value(value.into())));
        self
    }

    /// Point a reference field at a node, URL or raw mapping
    pub fn link(mut self, name: impl Into<String>, reference: impl Into<Reference>) -> Self {
        self.inputs
            .push((name.into(), FieldInput::Reference(reference.into())));
        self
    }

    /// Append a child to a collection field
    pub fn push(mut self, name: impl Into<String>, child: impl Into<Reference>) -> Self {
        let name = name.into();
        let child = child.into();
        match self.inputs.last_mut() {
            Some((last, FieldInput::References(children))) if *last == name => {
                children.push(child)
            }
            _ => self.inputs.push((name, FieldInput::References(vec![child]))),
        }
        self
    }

    /// Server identity, for nodes reconstructed from known records
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn timestamps(
        mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Build the node without touching the network
    ///
    /// # Errors
    ///
    /// - `UnknownNodeType`, `UnknownField`
    /// - `MissingRequiredFields` naming every absent required field
    /// - `TypeMismatch` for values or references outside the declared type
    pub fn build(self) -> Result<Node, NodeError> {
        let schema = registry().require(&self.type_name)?;

        if let Some((name, _)) = self.inputs.iter().find(|(n, _)| schema.field(n).is_none()) {
            return Err(NodeError::unknown_field(schema.type_name, name.as_str()));
        }

        let missing: Vec<String> = schema
            .required_fields()
            .filter(|required| {
                // the last assignment to a field wins
                !matches!(
                    self.inputs.iter().rev().find(|(n, _)| n.as_str() == *required),
                    Some((_, input)) if !input.is_empty()
                )
            })
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(NodeError::missing_required(schema.type_name, missing));
        }

        let mut fields = BTreeMap::new();
        for (name, input) in self.inputs {
            if let Some(spec) = schema.field(&name) {
                fields.insert(spec.name, convert_input(spec, input)?);
            }
        }
        for spec in &schema.fields {
            fields.entry(spec.name).or_insert_with(|| default_value(spec));
        }

        let primary = schema.is_primary();
        Ok(Node {
            schema,
            url: self.url.filter(|_| primary),
            created_at: self.created_at.filter(|_| primary),
            updated_at: self.updated_at.filter(|_| primary),
            fields,
        })
    }

    /// Build, then validate every vocabulary-bound field against `ctx`
    pub fn build_validated(self, ctx: &ValidationContext) -> Result<Node, NodeError> {
        let mut node = self.build()?;
        node.validate_vocabulary_in_place(ctx)?;
        Ok(node)
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
