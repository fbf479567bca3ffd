//! Vocabulary Validators
//!
//! Pure functions over a [`ValidationContext`]: check a key name, a value and
//! a unit against the session's controlled vocabulary. Keys starting with
//! [`CUSTOM_KEY_MARKER`] are user-defined and bypass the vocabulary entirely.

use crate::validation::{UnitError, ValidationContext, ValidationError};
use serde_json::Value;

/// Prefix marking a user-defined key unknown to the server vocabulary
pub const CUSTOM_KEY_MARKER: char = '+';

/// Whether `key` skips vocabulary lookup (empty or custom)
pub fn is_custom_key(key: &str) -> bool {
    key.is_empty() || key.starts_with(CUSTOM_KEY_MARKER)
}

fn present_unit(unit: Option<&str>) -> Option<&str> {
    unit.filter(|u| !u.trim().is_empty())
}

fn json_type_name(value: &Value) -> &'static str {
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

/// Validate a key name and return its canonical vocabulary spelling
///
/// # Errors
///
/// - `SessionRequired` if the context has no vocabulary
/// - `UnknownKey` if the key is not in `category`
pub fn validate_key(
    ctx: &ValidationContext,
    category: &str,
    key: &str,
) -> Result<String, ValidationError> {
    if is_custom_key(key) {
        return Ok(key.to_string());
    }

    let definition = ctx.vocabulary()?.lookup(category, key)?;
    Ok(definition.name.clone())
}

/// Validate a value for `key`, converting to the key's SI unit for range checks
///
/// Returns `Ok(None)` when the vocabulary declares no value type for the key:
/// a supplied value does not apply and is discarded.
///
/// # Errors
///
/// - `SessionRequired`, `UnknownKey` from the key lookup
/// - `MissingValue` if a value type is declared but `value` is `None`
/// - `InvalidValueType` if the value does not match the declared type
/// - `RequiredUnit`, `UnknownUnit`, `IncompatibleUnit` if a range check needs a
///   unit conversion that cannot be performed
/// - `InvalidValueRange` if the converted value lies outside `[min, max]`
pub fn validate_value(
    ctx: &ValidationContext,
    category: &str,
    key: &str,
    value: Option<&Value>,
    unit: Option<&str>,
) -> Result<Option<Value>, ValidationError> {
    if is_custom_key(key) {
        return Ok(value.cloned());
    }

    let definition = ctx.vocabulary()?.lookup(category, key)?;
    let value = match (value.filter(|v| !v.is_null()), definition.value_type) {
        (None, Some(_)) => return Err(ValidationError::missing_value(&definition.name)),
        (_, None) => return Ok(None),
        (Some(value), Some(value_type)) => {
            if !value_type.accepts(value) {
                return Err(ValidationError::invalid_value_type(
                    &definition.name,
                    value_type.to_string(),
                    json_type_name(value),
                ));
            }
            value
        }
    };

    if let Some((min, max)) = definition.bounds() {
        let magnitudes: Vec<f64> = match value {
            Value::Array(items) => items.iter().filter_map(Value::as_f64).collect(),
            other => other.as_f64().into_iter().collect(),
        };
        if magnitudes.is_empty() && !value.is_array() {
            return Err(ValidationError::invalid_value_type(
                &definition.name,
                "number",
                json_type_name(value),
            ));
        }

        for magnitude in magnitudes {
            let converted = match definition.si_unit.as_deref() {
                Some(si_unit) => {
                    let unit = present_unit(unit)
                        .ok_or_else(|| ValidationError::required_unit(&definition.name))?;
                    ctx.units()
                        .convert(magnitude, unit, si_unit)
                        .map_err(|e| match e {
                            UnitError::Unknown(_) => ValidationError::unknown_unit(unit),
                            UnitError::Incompatible { .. } => {
                                ValidationError::incompatible_unit(&definition.name, unit, si_unit)
                            }
                        })?
                }
                None => magnitude,
            };

            if !(min <= converted && converted <= max) {
                return Err(ValidationError::InvalidValueRange {
                    key: definition.name.clone(),
                    value: converted,
                    min,
                    max,
                    si_unit: definition.si_unit.clone(),
                });
            }
        }
    }

    Ok(Some(value.clone()))
}

/// Validate that a unit exists and suits `key`
///
/// The existence check runs for every supplied unit, custom keys included.
///
/// # Errors
///
/// - `UnknownUnit` if the unit system does not recognize the unit
/// - `SessionRequired`, `UnknownKey` from the key lookup
/// - `RequiredUnit` if the key declares an SI unit and none was given
/// - `UnitNotPermitted` if the key declares no SI unit and one was given
/// - `IncompatibleUnit` if the unit cannot be converted to the key's SI unit
pub fn validate_unit(
    ctx: &ValidationContext,
    category: &str,
    key: &str,
    unit: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    let unit = present_unit(unit);
    if let Some(unit) = unit {
        if !ctx.units().is_known(unit) {
            return Err(ValidationError::unknown_unit(unit));
        }
    }

    if is_custom_key(key) {
        return Ok(unit.map(str::to_string));
    }

    let definition = ctx.vocabulary()?.lookup(category, key)?;
    match (unit, definition.si_unit.as_deref()) {
        (None, None) => Ok(None),
        (None, Some(_)) => Err(ValidationError::required_unit(&definition.name)),
        (Some(unit), None) => Err(ValidationError::unit_not_permitted(&definition.name, unit)),
        (Some(unit), Some(si_unit)) => {
            ctx.units()
                .convert(1.0, unit, si_unit)
                .map_err(|_| ValidationError::incompatible_unit(&definition.name, unit, si_unit))?;
            Ok(Some(unit.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "validators_test.rs"]
mod validators_test;
