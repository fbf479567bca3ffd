//! Node Schema Types
//!
//! Every concrete node type is described by a [`NodeSchema`]: its stable type
//! name, its URL slug (primary nodes only), whether it is primary or secondary,
//! and a declarative list of fields. The node model interprets these schemas;
//! the concrete types themselves are data (see `core_schemas`).
//!
//! ## Reference targets
//!
//! Reference and collection fields carry a [`RefTarget`]: the set of node
//! types they accept and a [`Discriminator`] that decides which concrete type
//! a raw JSON mapping materializes into. Unions are closed and explicit: each
//! variant names the key whose presence selects it.
//!
//! ## Routed collections
//!
//! A [`RoutedCollection`] is a virtual collection name that dispatches each
//! child to one of several real collections by the child's concrete type
//! (a procedure's `ingredients` go to `product_ingredients` or
//! `material_ingredients`).

use serde::Serialize;
use serde_json::Value;

/// Persistence tier of a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Independently persisted, addressable by URL once saved
    Primary,
    /// Embedded in its owner, always inlined
    Secondary,
}

/// How a raw mapping selects its concrete node type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Discriminator {
    /// Only one type is acceptable
    Fixed(&'static str),
    /// The first listed key present in the mapping selects the paired type
    ByKey(Vec<(&'static str, &'static str)>),
}

impl Discriminator {
    /// Pick the concrete type for a raw mapping
    pub fn select(&self, payload: &serde_json::Map<String, Value>) -> Option<&'static str> {
        match self {
            Self::Fixed(type_name) => Some(*type_name),
            Self::ByKey(variants) => variants
                .iter()
                .find(|(key, _)| payload.contains_key(*key))
                .map(|(_, type_name)| *type_name),
        }
    }
}

/// Acceptable targets of a reference or collection field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefTarget {
    /// Node types the field accepts
    pub allowed: Vec<&'static str>,
    /// Raw-mapping type selection
    pub discriminator: Discriminator,
}

impl RefTarget {
    /// Target accepting exactly one node type
    pub fn one(type_name: &'static str) -> Self {
        Self {
            allowed: vec![type_name],
            discriminator: Discriminator::Fixed(type_name),
        }
    }

    /// Target accepting a union of types, discriminated by key presence
    pub fn union(variants: &[(&'static str, &'static str)]) -> Self {
        Self {
            allowed: variants.iter().map(|(_, type_name)| *type_name).collect(),
            discriminator: Discriminator::ByKey(variants.to_vec()),
        }
    }

    /// Whether `type_name` is an acceptable target
    pub fn accepts(&self, type_name: &str) -> bool {
        self.allowed.iter().any(|allowed| *allowed == type_name)
    }

    /// Human-readable list of accepted types
    pub fn describe(&self) -> String {
        self.allowed.join(" | ")
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Bool,
    StringList,
    /// Any JSON value (a keyed node's `value`)
    Any,
    /// Single reference to another node
    Reference(RefTarget),
    /// Ordered collection of child nodes
    Collection(RefTarget),
}

impl FieldType {
    /// Reference target for reference and collection fields
    pub fn target(&self) -> Option<&RefTarget> {
        match self {
            Self::Reference(target) | Self::Collection(target) => Some(target),
            _ => None,
        }
    }

    /// Whether a plain JSON value fits a scalar field type
    pub fn accepts_value(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::StringList => value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
            Self::Any => true,
            Self::Reference(_) | Self::Collection(_) => false,
        }
    }

    /// Short name used in error messages
    pub fn describe(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Number => "number".to_string(),
            Self::Bool => "boolean".to_string(),
            Self::StringList => "list[string]".to_string(),
            Self::Any => "any".to_string(),
            Self::Reference(target) => target.describe(),
            Self::Collection(target) => format!("list[{}]", target.describe()),
        }
    }
}

/// Definition of one field of a node type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    /// Value used when the field is omitted at construction
    pub default: Option<Value>,
    /// Vocabulary category the field's value(s) must be keys of
    pub vocabulary: Option<&'static str>,
}

impl FieldSpec {
    fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            required: false,
            default: None,
            vocabulary: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn number(name: &'static str) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn string_list(name: &'static str) -> Self {
        Self::new(name, FieldType::StringList)
    }

    pub fn any(name: &'static str) -> Self {
        Self::new(name, FieldType::Any)
    }

    pub fn reference(name: &'static str, target: RefTarget) -> Self {
        Self::new(name, FieldType::Reference(target))
    }

    pub fn collection(name: &'static str, target: RefTarget) -> Self {
        Self::new(name, FieldType::Collection(target))
    }

    /// Mark the field as required at construction
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Default for an omitted field
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Bind the field to a vocabulary category
    pub fn bound_to(mut self, category: &'static str) -> Self {
        self.vocabulary = Some(category);
        self
    }

    /// Whether the field holds child nodes
    pub fn is_collection(&self) -> bool {
        matches!(self.field_type, FieldType::Collection(_))
    }
}

/// A `(key, value, unit)` triple validated against one vocabulary category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedFields {
    pub category: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub unit: &'static str,
}

impl KeyedFields {
    /// The conventional `key` / `value` / `unit` field names
    pub fn standard(category: &'static str) -> Self {
        Self {
            category,
            key: "key",
            value: "value",
            unit: "unit",
        }
    }
}

/// Virtual collection dispatching children by concrete type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedCollection {
    pub name: &'static str,
    pub target: RefTarget,
    /// `(node type, real collection field)` pairs
    pub routes: Vec<(&'static str, &'static str)>,
}

impl RoutedCollection {
    /// Real collection for a child of `type_name`
    pub fn route_for(&self, type_name: &str) -> Option<&'static str> {
        self.routes
            .iter()
            .find(|(routed_type, _)| *routed_type == type_name)
            .map(|(_, collection)| *collection)
    }
}

/// Complete declaration of a node type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSchema {
    /// Stable type identifier (e.g. "Material")
    pub type_name: &'static str,
    /// URL path segment for primary types (e.g. "material")
    pub slug: Option<&'static str>,
    pub kind: NodeKind,
    pub fields: Vec<FieldSpec>,
    pub routed: Vec<RoutedCollection>,
    pub keyed: Option<KeyedFields>,
}

impl NodeSchema {
    /// Primary node type addressable under `slug`
    pub fn primary(type_name: &'static str, slug: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self {
            type_name,
            slug: Some(slug),
            kind: NodeKind::Primary,
            fields,
            routed: Vec::new(),
            keyed: None,
        }
    }

    /// Secondary (embedded) node type
    pub fn secondary(type_name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self {
            type_name,
            slug: None,
            kind: NodeKind::Secondary,
            fields,
            routed: Vec::new(),
            keyed: None,
        }
    }

    /// Attach a keyed `(key, value, unit)` triple
    pub fn with_keyed(mut self, keyed: KeyedFields) -> Self {
        self.keyed = Some(keyed);
        self
    }

    /// Attach a routed collection
    pub fn with_routed(mut self, routed: RoutedCollection) -> Self {
        self.routed.push(routed);
        self
    }

    /// Field definition by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Collection field definition by name
    pub fn collection(&self, name: &str) -> Option<&FieldSpec> {
        self.field(name).filter(|f| f.is_collection())
    }

    /// Routed collection by name
    pub fn routed_collection(&self, name: &str) -> Option<&RoutedCollection> {
        self.routed.iter().find(|r| r.name == name)
    }

    /// Names of all required fields
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.required).map(|f| f.name)
    }

    pub fn is_primary(&self) -> bool {
        self.kind == NodeKind::Primary
    }
}
