//! Controlled Vocabulary Table
//!
//! The server publishes, per key category, the list of permitted keys together
//! with the value type, numeric range and units each key accepts. The table is
//! fetched once per session and is read-only afterwards.
//!
//! ```json
//! {
//!   "material-property-key": [
//!     {"name": "modulus", "value_type": "number", "range": [0, 100],
//!      "unit": "Pa", "si_unit": "Pa"}
//!   ],
//!   "process-property-key": []
//! }
//! ```

use crate::validation::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Query category that spans both material and process property keys
pub const PROPERTY_KEY_CATEGORY: &str = "property-key";

const PROPERTY_KEY_MEMBERS: [&str; 2] = ["material-property-key", "process-property-key"];

/// Logical value types a vocabulary entry may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueType {
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "list[number]")]
    NumberList,
    #[serde(rename = "list[integer]")]
    IntegerList,
    #[serde(rename = "list[float]")]
    FloatList,
    #[serde(rename = "list[string]")]
    StringList,
}

impl ValueType {
    /// Element type for list forms, `None` for scalar types
    pub fn element(self) -> Option<ValueType> {
        match self {
            Self::NumberList => Some(Self::Number),
            Self::IntegerList => Some(Self::Integer),
            Self::FloatList => Some(Self::Float),
            Self::StringList => Some(Self::String),
            _ => None,
        }
    }

    /// Whether a single JSON value satisfies this scalar type
    pub fn accepts_scalar(self, value: &serde_json::Value) -> bool {
        match self {
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_f64(),
            Self::String => value.is_string(),
            _ => false,
        }
    }

    /// Whether a JSON value satisfies this type, checking every element of list forms
    pub fn accepts(self, value: &serde_json::Value) -> bool {
        match self.element() {
            Some(element) => value
                .as_array()
                .map(|items| items.iter().all(|item| element.accepts_scalar(item)))
                .unwrap_or(false),
            None => self.accepts_scalar(value),
        }
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::String),
            "list[number]" => Ok(Self::NumberList),
            "list[integer]" => Ok(Self::IntegerList),
            "list[float]" => Ok(Self::FloatList),
            "list[string]" => Ok(Self::StringList),
            other => Err(format!("Unsupported value type: {}", other)),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::NumberList => "list[number]",
            Self::IntegerList => "list[integer]",
            Self::FloatList => "list[float]",
            Self::StringList => "list[string]",
        };
        write!(f, "{}", name)
    }
}

/// A single permitted key within a vocabulary category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDefinition {
    /// Canonical key name
    pub name: String,

    /// Declared value type; `None` means the key takes no value
    #[serde(default, deserialize_with = "blank_as_none_parsed")]
    pub value_type: Option<ValueType>,

    /// Closed numeric range `[min, max]`, expressed in `si_unit`
    #[serde(default)]
    pub range: Option<Vec<f64>>,

    /// Suggested display unit
    #[serde(default, deserialize_with = "blank_as_none")]
    pub unit: Option<String>,

    /// Canonical SI unit; `None` means the key forbids units
    #[serde(default, deserialize_with = "blank_as_none")]
    pub si_unit: Option<String>,
}

impl KeyDefinition {
    /// Create a definition with only a name (no value, no unit)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: None,
            range: None,
            unit: None,
            si_unit: None,
        }
    }

    /// Set the declared value type
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Set the closed numeric range
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some(vec![min, max]);
        self
    }

    /// Set both display and SI unit
    pub fn with_si_unit(mut self, si_unit: impl Into<String>) -> Self {
        let si_unit = si_unit.into();
        self.unit = Some(si_unit.clone());
        self.si_unit = Some(si_unit);
        self
    }

    /// The `(min, max)` bounds when a well-formed range is declared
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self.range.as_deref() {
            Some([min, max]) => Some((*min, *max)),
            _ => None,
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn blank_as_none_parsed<'de, D>(deserializer: D) -> Result<Option<ValueType>, D::Error>
where
    D: Deserializer<'de>,
{
    blank_as_none(deserializer)?
        .map(|s| s.parse().map_err(serde::de::Error::custom))
        .transpose()
}

/// Normalize a caller-supplied key for lookup
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// The full vocabulary table, keyed by category name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    categories: HashMap<String, Vec<KeyDefinition>>,
}

impl Vocabulary {
    /// Create an empty vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a category's key list
    pub fn with_category(mut self, category: impl Into<String>, keys: Vec<KeyDefinition>) -> Self {
        self.categories.insert(category.into(), keys);
        self
    }

    /// Names of all loaded categories
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Total number of key definitions across all categories
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Whether no key definitions are loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries<'a>(&'a self, category: &str) -> Box<dyn Iterator<Item = &'a KeyDefinition> + 'a> {
        if category == PROPERTY_KEY_CATEGORY {
            Box::new(
                PROPERTY_KEY_MEMBERS
                    .iter()
                    .filter_map(|member| self.categories.get(*member))
                    .flatten(),
            )
        } else {
            Box::new(self.categories.get(category).into_iter().flatten())
        }
    }

    /// Find the definition for `key` in `category`
    ///
    /// The key is trimmed and lowercased before comparison. The
    /// `property-key` category searches both material and process property keys.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownKey` when no entry matches.
    pub fn lookup(&self, category: &str, key: &str) -> Result<&KeyDefinition, ValidationError> {
        let wanted = normalize_key(key);
        self.entries(category)
            .find(|def| normalize_key(&def.name) == wanted)
            .ok_or_else(|| ValidationError::unknown_key(wanted, category.replace('-', " ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_server_table() {
        let vocabulary: Vocabulary = serde_json::from_value(json!({
            "material-property-key": [
                {"name": "modulus", "value_type": "number", "range": [0, 100],
                 "unit": "Pa", "si_unit": "Pa"},
                {"name": "color", "value_type": "string", "range": null,
                 "unit": "", "si_unit": ""}
            ],
            "process-property-key": [
                {"name": "yield", "value_type": "number", "range": [0, 1], "si_unit": null}
            ]
        }))
        .unwrap();

        assert_eq!(vocabulary.len(), 3);
        let color = vocabulary.lookup("material-property-key", "Color").unwrap();
        assert_eq!(color.value_type, Some(ValueType::String));
        assert_eq!(color.si_unit, None);
        assert_eq!(color.unit, None);
    }

    #[test]
    fn test_property_key_spans_material_and_process() {
        let vocabulary = Vocabulary::new()
            .with_category("material-property-key", vec![KeyDefinition::new("density")])
            .with_category("process-property-key", vec![KeyDefinition::new("yield")]);

        assert!(vocabulary.lookup(PROPERTY_KEY_CATEGORY, "density").is_ok());
        assert!(vocabulary.lookup(PROPERTY_KEY_CATEGORY, "yield").is_ok());
        assert!(vocabulary.lookup("material-property-key", "yield").is_err());

        let mut names: Vec<_> = vocabulary.categories().collect();
        names.sort_unstable();
        assert_eq!(names, ["material-property-key", "process-property-key"]);
        assert_eq!(vocabulary.len(), 2);
    }

    #[test]
    fn test_unknown_key_reports_readable_category() {
        let vocabulary = Vocabulary::new().with_category("condition-key", vec![]);
        let err = vocabulary.lookup("condition-key", " Pressure ").unwrap_err();
        assert_eq!(err, ValidationError::unknown_key("pressure", "condition key"));
    }

    #[test]
    fn test_list_types_check_every_element() {
        assert!(ValueType::NumberList.accepts(&json!([1, 2.5])));
        assert!(!ValueType::IntegerList.accepts(&json!([1, 2.5])));
        assert!(!ValueType::StringList.accepts(&json!("a")));
        assert!(ValueType::Float.accepts(&json!(1.0)));
        assert!(!ValueType::Float.accepts(&json!(1)));
        assert!(!ValueType::Number.accepts(&json!(true)));
    }
}
