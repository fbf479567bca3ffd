//! Node Graph Integration Tests
//!
//! End-to-end checks of the in-memory graph through the public API only:
//! building nested records, lowering them for upload, applying server
//! records and round-tripping collection edits.

#[cfg(test)]
mod node_graph_tests {
    use anyhow::Result;
    use cript_core::validation::{
        validate_key, validate_unit, validate_value, KeyDefinition, ValueType,
    };
    use cript_core::{
        MaterialNode, Node, NodeError, ProcedureNode, Reference, Serializable, ValidationContext,
        ValidationError, Vocabulary,
    };
    use serde_json::json;

    const BASE: &str = "https://x";
    const GROUP: &str = "https://x/group/1/";
    const MATERIAL_URL: &str = "https://x/material/1/";

    fn context() -> ValidationContext {
        ValidationContext::new(Vocabulary::new().with_category(
            "material-property-key",
            vec![
                KeyDefinition::new("modulus")
                    .with_value_type(ValueType::Number)
                    .with_range(0.0, 100.0)
                    .with_si_unit("Pa"),
                KeyDefinition::new("color").with_value_type(ValueType::String),
            ],
        ))
    }

    fn material(name: &str) -> Result<Node> {
        Ok(Node::builder("Material")
            .set("group", GROUP)
            .set("name", name)
            .build()?)
    }

    fn component(identity: Node) -> Result<Node> {
        Ok(Node::builder("MaterialComponent")
            .link("component", identity)
            .build()?)
    }

    fn identity(url: Option<&str>) -> Result<Node> {
        let builder = Node::builder("Identity")
            .set("group", GROUP)
            .set("name", "styrene");
        Ok(match url {
            Some(url) => builder.url(url).build()?,
            None => builder.build()?,
        })
    }

    #[test]
    fn test_lowering_fails_iff_nested_primary_is_unsaved() -> Result<()> {
        let mut unsaved = Node::builder("Material")
            .set("group", GROUP)
            .set("name", "PS")
            .push("components", component(identity(None)?)?)
            .build()?;
        assert!(matches!(
            unsaved.prepare_for_transmission(),
            Err(NodeError::UnsavedNode { .. })
        ));

        let saved = component(identity(Some("https://x/identity/3/"))?)?;
        unsaved.remove_child("components", 0usize)?;
        unsaved.add_child("components", saved)?;
        let payload = unsaved.prepare_for_transmission()?;
        assert_eq!(
            payload["components"],
            json!([{"component": "https://x/identity/3/", "component_id": 0}])
        );
        Ok(())
    }

    #[test]
    fn test_secondary_nodes_are_always_inlined() -> Result<()> {
        let property = Node::builder("Property")
            .set("key", "modulus")
            .set("value", 3.2)
            .set("unit", "GPa")
            .build()?;
        let mut node = MaterialNode::builder("PS", GROUP)
            .with_property(property)
            .build()?;
        node.add_condition(Node::builder("Condition").set("key", "temperature").build()?)?;

        let payload = node.prepare_for_transmission()?;
        assert_eq!(payload["properties"][0]["key"], json!("modulus"));
        assert_eq!(payload["properties"][0]["unit"], json!("GPa"));
        assert_eq!(payload["conditions"][0]["key"], json!("temperature"));
        Ok(())
    }

    #[test]
    fn test_saved_reference_lowers_to_exact_url() -> Result<()> {
        let mut product = material("PS")?;
        product.apply_remote_state(
            json!({"url": MATERIAL_URL, "created_at": "2024-01-01T00:00:00Z"})
                .as_object()
                .expect("object"),
            BASE,
        )?;

        let experiment = Node::builder("Experiment")
            .set("group", GROUP)
            .set("collection", "https://x/collection/2/")
            .set("name", "run 1")
            .link("product", product)
            .build()?;
        let payload = experiment.prepare_for_transmission()?;
        assert_eq!(payload["product"], json!(MATERIAL_URL));
        Ok(())
    }

    #[test]
    fn test_add_then_remove_last_restores_collection() -> Result<()> {
        let mut node = MaterialNode::builder("PS", GROUP)
            .with_property(Node::builder("Property").set("key", "color").build()?)
            .build()?;
        let before = node.properties().to_vec();

        let added = Node::builder("Property").set("key", "modulus").build()?;
        node.add_property(added.clone())?;
        let last = node.properties().len() - 1;
        let removed = node.remove_property(last)?;

        assert_eq!(removed, Reference::from(added));
        assert_eq!(node.properties(), before.as_slice());
        Ok(())
    }

    #[test]
    fn test_unsaved_primary_child_never_added() -> Result<()> {
        let mut collection = Node::builder("Collection")
            .set("group", GROUP)
            .set("name", "campaign")
            .build()?;
        let experiment = Node::builder("Experiment")
            .set("group", GROUP)
            .set("collection", "https://x/collection/2/")
            .set("name", "run 1")
            .build()?;

        let err = collection.add_child("experiments", experiment).unwrap_err();
        assert!(matches!(err, NodeError::UnsavedNode { .. }));
        assert_eq!(collection.children("experiments").map(<[_]>::len), Some(0));

        // the same holds for routed collections
        let mut procedure = ProcedureNode::new(1)?;
        let ingredient = Node::builder("MaterialIngredient")
            .set("ingredient", MATERIAL_URL)
            .set("keyword", "monomer")
            .build()?;
        assert!(matches!(
            procedure.add_ingredient(material("solvent")?),
            Err(NodeError::UnsavedNode { .. })
        ));
        procedure.add_ingredient(ingredient)?;
        assert_eq!(procedure.material_ingredients().len(), 1);
        Ok(())
    }

    #[test]
    fn test_validators_through_public_api() -> Result<()> {
        let ctx = context();
        assert_eq!(
            validate_key(&ctx, "material-property-key", "  Modulus ")?,
            "modulus"
        );
        assert!(validate_value(&ctx, "material-property-key", "modulus", Some(&json!(50)), Some("Pa")).is_ok());
        assert!(matches!(
            validate_value(&ctx, "material-property-key", "modulus", Some(&json!(150)), Some("Pa")),
            Err(ValidationError::InvalidValueRange { .. })
        ));
        assert!(
            validate_value(&ctx, "material-property-key", "modulus", Some(&json!(0.05)), Some("kPa")).is_ok()
        );
        assert!(matches!(
            validate_unit(&ctx, "material-property-key", "color", Some("m")),
            Err(ValidationError::UnitNotPermitted { .. })
        ));
        assert!(matches!(
            validate_unit(&ctx, "material-property-key", "modulus", None),
            Err(ValidationError::RequiredUnit { .. })
        ));
        assert_eq!(
            validate_key(&ctx, "material-property-key", "+my_key")?,
            "+my_key"
        );
        Ok(())
    }
}
