//! Validation Error Types
//!
//! Errors raised by the vocabulary validators. Every variant names the key
//! (and where relevant the unit) that failed so callers can report it directly.

use thiserror::Error;

/// Vocabulary and unit validation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Key is not part of the controlled vocabulary for the category
    #[error("'{key}' is not a valid {category}")]
    UnknownKey { key: String, category: String },

    /// Vocabulary declares a value type but no value was supplied
    #[error("A value must be defined for '{key}'")]
    MissingValue { key: String },

    /// Value does not match the vocabulary's declared value type
    #[error("Value for '{key}' must be of type {expected}, got {found}")]
    InvalidValueType {
        key: String,
        expected: String,
        found: String,
    },

    /// Value (after SI conversion) falls outside the declared closed range
    #[error("Value {value} for '{key}' is outside the range [{min}, {max}]{}", si_suffix(.si_unit))]
    InvalidValueRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
        si_unit: Option<String>,
    },

    /// Unit is not recognized by the unit system at all
    #[error("'{unit}' is not a recognized unit of measure")]
    UnknownUnit { unit: String },

    /// Vocabulary requires a unit but none was given
    #[error("A unit is required for '{key}'")]
    RequiredUnit { key: String },

    /// Vocabulary forbids a unit but one was given
    #[error("A unit is not permitted for '{key}' (got '{unit}')")]
    UnitNotPermitted { key: String, unit: String },

    /// Unit exists but cannot be converted to the key's SI unit
    #[error("'{unit}' cannot be converted to '{si_unit}' for '{key}'")]
    IncompatibleUnit {
        key: String,
        unit: String,
        si_unit: String,
    },

    /// Keyed validation attempted before a vocabulary table was loaded
    #[error("A session with a loaded vocabulary is required for keyed validation")]
    SessionRequired,
}

fn si_suffix(si_unit: &Option<String>) -> String {
    match si_unit {
        Some(unit) => format!(" {}", unit),
        None => String::new(),
    }
}

impl ValidationError {
    /// Create an unknown key error
    pub fn unknown_key(key: impl Into<String>, category: impl Into<String>) -> Self {
        Self::UnknownKey {
            key: key.into(),
            category: category.into(),
        }
    }

    /// Create a missing value error
    pub fn missing_value(key: impl Into<String>) -> Self {
        Self::MissingValue { key: key.into() }
    }

    /// Create an invalid value type error
    pub fn invalid_value_type(
        key: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidValueType {
            key: key.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unknown unit error
    pub fn unknown_unit(unit: impl Into<String>) -> Self {
        Self::UnknownUnit { unit: unit.into() }
    }

    /// Create a required unit error
    pub fn required_unit(key: impl Into<String>) -> Self {
        Self::RequiredUnit { key: key.into() }
    }

    /// Create a unit-not-permitted error
    pub fn unit_not_permitted(key: impl Into<String>, unit: impl Into<String>) -> Self {
        Self::UnitNotPermitted {
            key: key.into(),
            unit: unit.into(),
        }
    }

    /// Create an incompatible unit error
    pub fn incompatible_unit(
        key: impl Into<String>,
        unit: impl Into<String>,
        si_unit: impl Into<String>,
    ) -> Self {
        Self::IncompatibleUnit {
            key: key.into(),
            unit: unit.into(),
            si_unit: si_unit.into(),
        }
    }
}
