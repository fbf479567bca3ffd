//! Validation Engine
//!
//! Field-level validation against the server's controlled vocabulary:
//!
//! - [`validate_key`] - key names, canonicalized to the vocabulary spelling
//! - [`validate_value`] - value type and unit-aware range checks
//! - [`validate_unit`] - unit existence and SI convertibility
//!
//! All validators take an explicit [`ValidationContext`]; there is no
//! process-wide vocabulary cache. Node-level required-field checks live with
//! the node model.

mod context;
mod error;
mod units;
mod validators;
mod vocabulary;

pub use context::ValidationContext;
pub use error::ValidationError;
pub use units::{UnitError, UnitRegistry, UnitSystem};
pub use validators::{
    is_custom_key, validate_key, validate_unit, validate_value, CUSTOM_KEY_MARKER,
};
pub use vocabulary::{
    normalize_key, KeyDefinition, ValueType, Vocabulary, PROPERTY_KEY_CATEGORY,
};
