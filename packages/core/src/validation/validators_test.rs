//! Tests for the vocabulary validators
//!
//! Covers key canonicalization, value type and range checks with unit
//! conversion, unit existence/permission rules, and the custom-key bypass.

#[cfg(test)]
mod tests {
    use crate::validation::{
        validate_key, validate_unit, validate_value, KeyDefinition, ValidationContext,
        ValidationError, ValueType, Vocabulary,
    };
    use serde_json::json;

    const MATERIAL: &str = "material-property-key";

    fn context() -> ValidationContext {
        let vocabulary = Vocabulary::new()
            .with_category(
                MATERIAL,
                vec![
                    KeyDefinition::new("modulus")
                        .with_value_type(ValueType::Number)
                        .with_range(0.0, 100.0)
                        .with_si_unit("Pa"),
                    KeyDefinition::new("color").with_value_type(ValueType::String),
                    KeyDefinition::new("crystalline"),
                    KeyDefinition::new("composition").with_value_type(ValueType::NumberList),
                ],
            )
            .with_category(
                "process-property-key",
                vec![KeyDefinition::new("yield")
                    .with_value_type(ValueType::Number)
                    .with_range(0.0, 1.0)],
            );
        ValidationContext::new(vocabulary)
    }

    // ========================================================================
    // validate_key
    // ========================================================================

    #[test]
    fn test_validate_key_returns_canonical_name() {
        let ctx = context();
        assert_eq!(validate_key(&ctx, MATERIAL, "  Modulus ").unwrap(), "modulus");
    }

    #[test]
    fn test_validate_key_unknown() {
        let ctx = context();
        let err = validate_key(&ctx, MATERIAL, "hardness").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownKey { key, .. } if key == "hardness"));
    }

    #[test]
    fn test_validate_key_property_key_union() {
        let ctx = context();
        assert_eq!(validate_key(&ctx, "property-key", "YIELD").unwrap(), "yield");
        assert_eq!(validate_key(&ctx, "property-key", "modulus").unwrap(), "modulus");
    }

    #[test]
    fn test_validate_key_requires_session() {
        let ctx = ValidationContext::detached();
        assert_eq!(
            validate_key(&ctx, MATERIAL, "modulus"),
            Err(ValidationError::SessionRequired)
        );
    }

    // ========================================================================
    // validate_value
    // ========================================================================

    #[test]
    fn test_validate_value_within_range() {
        let ctx = context();
        let value = validate_value(&ctx, MATERIAL, "modulus", Some(&json!(50)), Some("Pa"));
        assert_eq!(value.unwrap(), Some(json!(50)));
    }

    #[test]
    fn test_validate_value_outside_range() {
        let ctx = context();
        let err = validate_value(&ctx, MATERIAL, "modulus", Some(&json!(150)), Some("Pa"))
            .unwrap_err();
        match err {
            ValidationError::InvalidValueRange {
                key,
                value,
                min,
                max,
                ..
            } => {
                assert_eq!(key, "modulus");
                assert_eq!(value, 150.0);
                assert_eq!(min, 0.0);
                assert_eq!(max, 100.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_value_converts_before_range_check() {
        let ctx = context();
        let value = validate_value(&ctx, MATERIAL, "modulus", Some(&json!(0.05)), Some("kPa"));
        assert_eq!(value.unwrap(), Some(json!(0.05)));

        let err = validate_value(&ctx, MATERIAL, "modulus", Some(&json!(0.5)), Some("kPa"));
        assert!(matches!(err, Err(ValidationError::InvalidValueRange { .. })));
    }

    #[test]
    fn test_validate_value_range_is_closed() {
        let ctx = context();
        assert!(validate_value(&ctx, MATERIAL, "modulus", Some(&json!(0)), Some("Pa")).is_ok());
        assert!(validate_value(&ctx, MATERIAL, "modulus", Some(&json!(100)), Some("Pa")).is_ok());
    }

    #[test]
    fn test_validate_value_missing_value() {
        let ctx = context();
        let err = validate_value(&ctx, MATERIAL, "color", None, None).unwrap_err();
        assert_eq!(err, ValidationError::missing_value("color"));
    }

    #[test]
    fn test_validate_value_discarded_when_key_takes_no_value() {
        let ctx = context();
        let value = validate_value(&ctx, MATERIAL, "crystalline", Some(&json!("yes")), None);
        assert_eq!(value.unwrap(), None);
    }

    #[test]
    fn test_validate_value_type_mismatch() {
        let ctx = context();
        let err = validate_value(&ctx, MATERIAL, "color", Some(&json!(3)), None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValueType { .. }));

        let err = validate_value(&ctx, MATERIAL, "composition", Some(&json!([1, "a"])), None)
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValueType { .. }));
    }

    #[test]
    fn test_validate_value_incompatible_unit() {
        let ctx = context();
        let err =
            validate_value(&ctx, MATERIAL, "modulus", Some(&json!(1)), Some("K")).unwrap_err();
        assert!(matches!(err, ValidationError::IncompatibleUnit { .. }));
    }

    #[test]
    fn test_validate_value_range_without_si_unit() {
        let ctx = context();
        assert!(validate_value(&ctx, "property-key", "yield", Some(&json!(0.8)), None).is_ok());
        assert!(validate_value(&ctx, "property-key", "yield", Some(&json!(1.2)), None).is_err());
    }

    // ========================================================================
    // validate_unit
    // ========================================================================

    #[test]
    fn test_validate_unit_not_permitted() {
        let ctx = context();
        let err = validate_unit(&ctx, MATERIAL, "color", Some("Pa")).unwrap_err();
        assert_eq!(err, ValidationError::unit_not_permitted("color", "Pa"));
    }

    #[test]
    fn test_validate_unit_required() {
        let ctx = context();
        let err = validate_unit(&ctx, MATERIAL, "modulus", None).unwrap_err();
        assert_eq!(err, ValidationError::required_unit("modulus"));
    }

    #[test]
    fn test_validate_unit_convertible() {
        let ctx = context();
        assert_eq!(
            validate_unit(&ctx, MATERIAL, "modulus", Some("MPa")).unwrap(),
            Some("MPa".to_string())
        );
        assert!(matches!(
            validate_unit(&ctx, MATERIAL, "modulus", Some("degC")),
            Err(ValidationError::IncompatibleUnit { .. })
        ));
    }

    #[test]
    fn test_validate_unit_unknown_even_for_custom_keys() {
        let ctx = context();
        assert_eq!(
            validate_unit(&ctx, MATERIAL, "+my_field", Some("blorps")),
            Err(ValidationError::unknown_unit("blorps"))
        );
    }

    #[test]
    fn test_validate_unit_none_for_unitless_key() {
        let ctx = context();
        assert_eq!(validate_unit(&ctx, MATERIAL, "color", None).unwrap(), None);
    }

    // ========================================================================
    // Custom keys
    // ========================================================================

    #[test]
    fn test_custom_key_bypasses_all_validators() {
        let empty = ValidationContext::new(Vocabulary::new());
        let detached = ValidationContext::detached();

        for ctx in [&empty, &detached] {
            assert_eq!(
                validate_key(ctx, MATERIAL, "+custom_field").unwrap(),
                "+custom_field"
            );
            assert_eq!(
                validate_value(ctx, MATERIAL, "+custom_field", Some(&json!(1e9)), Some("Pa"))
                    .unwrap(),
                Some(json!(1e9))
            );
            assert_eq!(
                validate_unit(ctx, MATERIAL, "+custom_field", Some("Pa")).unwrap(),
                Some("Pa".to_string())
            );
        }
    }
}
