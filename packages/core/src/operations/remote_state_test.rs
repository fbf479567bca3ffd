//! Tests for apply_remote_state

#[cfg(test)]
mod tests {
    use crate::models::{Node, NodeError, Reference};
    use serde_json::json;

    const BASE: &str = "https://criptapp.org/api";
    const GROUP: &str = "https://criptapp.org/api/group/1/";

    fn material() -> Node {
        Node::builder("Material")
            .set("name", "polystyrene")
            .set("group", GROUP)
            .build()
            .unwrap()
    }

    #[test]
    fn test_sets_identity_and_overwrites_fields() {
        let mut node = material();
        let record = json!({
            "url": "https://criptapp.org/api/material/9/",
            "created_at": "2023-05-01T00:00:00Z",
            "updated_at": "2023-05-02T00:00:00Z",
            "name": "PS-1",
            "notes": "from server"
        });
        node.apply_remote_state(record.as_object().unwrap(), BASE)
            .unwrap();

        assert_eq!(node.url(), Some("https://criptapp.org/api/material/9/"));
        assert!(node.created_at().is_some());
        assert_eq!(node.str_value("name"), Some("PS-1"));
        assert_eq!(node.str_value("notes"), Some("from server"));
    }

    #[test]
    fn test_ignores_echoed_service_links() {
        let mut experiment = Node::builder("Experiment")
            .set("group", GROUP)
            .set("collection", "https://criptapp.org/api/collection/1/")
            .set("name", "run")
            .link("product", "https://elsewhere.org/material/4/")
            .build()
            .unwrap();

        let record = json!({
            "product": "https://criptapp.org/api/material/4/",
            "notes": "see https://criptapp.org/api/docs"
        });
        experiment
            .apply_remote_state(record.as_object().unwrap(), BASE)
            .unwrap();

        assert_eq!(
            experiment.reference("product").and_then(Reference::url),
            Some("https://elsewhere.org/material/4/")
        );
        // any string containing the base URL is skipped, not only links
        assert_eq!(experiment.value("notes"), None);
    }

    #[test]
    fn test_recurses_into_live_nested_node() {
        let process = Node::builder("Process")
            .set("group", GROUP)
            .set("name", "anneal")
            .set("notes", "local draft")
            .build()
            .unwrap();
        let mut experiment = Node::builder("Experiment")
            .set("group", GROUP)
            .set("collection", "https://criptapp.org/api/collection/1/")
            .set("name", "run")
            .link("process", process)
            .build()
            .unwrap();

        let record = json!({"process": {"name": "anneal-2"}});
        experiment
            .apply_remote_state(record.as_object().unwrap(), BASE)
            .unwrap();

        let nested = experiment.reference("process").unwrap().as_node().unwrap();
        assert_eq!(nested.str_value("name"), Some("anneal-2"));
        assert_eq!(nested.str_value("notes"), Some("local draft"));
    }

    #[test]
    fn test_collections_are_overwritten_and_materialized() {
        let mut node = material();
        node.add_child(
            "properties",
            Node::builder("Property").set("key", "old").build().unwrap(),
        )
        .unwrap();

        let record = json!({"properties": [{"key": "modulus", "value": 1, "unit": "Pa"}]});
        node.apply_remote_state(record.as_object().unwrap(), BASE)
            .unwrap();

        let children = node.children("properties").unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(
            children[0].as_node().unwrap().str_value("key"),
            Some("modulus")
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut node = material();
        let before = node.clone();
        let record = json!({"uid": "_:abc", "model_version": "1.0.0"});
        node.apply_remote_state(record.as_object().unwrap(), BASE)
            .unwrap();
        assert_eq!(node, before);
    }

    #[test]
    fn test_failure_leaves_node_unchanged() {
        let mut node = material();
        let before = node.clone();
        let record = json!({"name": "renamed", "created_at": "yesterday"});
        let err = node
            .apply_remote_state(record.as_object().unwrap(), BASE)
            .unwrap_err();
        assert!(matches!(err, NodeError::InvalidTimestamp { .. }));
        assert_eq!(node, before);
    }

    #[test]
    fn test_mistyped_field_is_skipped_and_identity_still_applied() {
        let mut node = material();
        let record = json!({
            "url": "https://criptapp.org/api/material/9/",
            "name": 42,
            "notes": "kept"
        });
        node.apply_remote_state(record.as_object().unwrap(), BASE)
            .unwrap();
        assert_eq!(node.url(), Some("https://criptapp.org/api/material/9/"));
        assert_eq!(node.str_value("name"), Some("polystyrene"));
        assert_eq!(node.str_value("notes"), Some("kept"));
    }
}
