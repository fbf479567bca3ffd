//! Tests for reference normalization and dereference

#[cfg(test)]
mod tests {
    use crate::gateway::{GatewayError, RemoteResponse, SyncGateway};
    use crate::models::schema::RefTarget;
    use crate::models::{Node, NodeError, Reference};
    use crate::resolver::{dereference, materialize, normalize};
    use crate::services::SyncError;
    use crate::validation::Vocabulary;
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};

    const GROUP: &str = "https://criptapp.org/api/group/1/";

    /// Serves a single stored record
    struct OneRecord {
        url: &'static str,
        record: Value,
    }

    #[async_trait]
    impl SyncGateway for OneRecord {
        fn base_url(&self) -> &str {
            "https://criptapp.org/api"
        }

        async fn verify(&self) -> Result<(), GatewayError> {
            Ok(())
        }

        async fn fetch_vocabulary(&self) -> Result<Vocabulary, GatewayError> {
            Ok(Vocabulary::new())
        }

        async fn create(&self, _: &str, _: &Value) -> Result<RemoteResponse, GatewayError> {
            Ok(RemoteResponse::new(405, Value::Null))
        }

        async fn update(&self, _: &str, _: &Value) -> Result<RemoteResponse, GatewayError> {
            Ok(RemoteResponse::new(405, Value::Null))
        }

        async fn fetch(&self, url: &str) -> Result<Map<String, Value>, GatewayError> {
            if url == self.url {
                Ok(self.record.as_object().cloned().unwrap_or_default())
            } else {
                Err(GatewayError::not_found(url))
            }
        }

        async fn query(&self, _: &str, _: &str) -> Result<Value, GatewayError> {
            Ok(json!([]))
        }
    }

    fn property() -> Node {
        Node::builder("Property").set("key", "modulus").build().unwrap()
    }

    // ========================================================================
    // normalize
    // ========================================================================

    #[test]
    fn test_normalize_keeps_accepted_node() {
        let target = RefTarget::one("Property");
        let normalized = normalize("properties", property().into(), &target).unwrap();
        assert_eq!(normalized.as_node(), Some(&property()));
    }

    #[test]
    fn test_normalize_rejects_node_outside_target() {
        let target = RefTarget::one("Condition");
        assert_eq!(
            normalize("conditions", property().into(), &target),
            Err(NodeError::type_mismatch("conditions", "Condition", "Property"))
        );
    }

    #[test]
    fn test_normalize_leaves_url_remote() {
        let target = RefTarget::one("Group");
        assert_eq!(
            normalize("group", GROUP.into(), &target),
            Ok(Reference::Remote(GROUP.to_string()))
        );
    }

    #[test]
    fn test_normalize_bare_url_mapping_becomes_remote() {
        let target = RefTarget::one("Group");
        let raw = json!({"url": GROUP});
        assert_eq!(
            normalize("group", raw.as_object().unwrap().clone().into(), &target),
            Ok(Reference::Remote(GROUP.to_string()))
        );
    }

    #[test]
    fn test_normalize_url_for_embedded_only_target_fails() {
        let target = RefTarget::one("Property");
        assert!(matches!(
            normalize("properties", "https://criptapp.org/api/property/1/".into(), &target),
            Err(NodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_materialize_recurses_into_nested_mappings() {
        let target = RefTarget::one("Property");
        let raw = json!({
            "key": "modulus",
            "conditions": [{"key": "temperature", "value": 25, "unit": "degC"}]
        });
        let node = materialize("properties", raw.as_object().unwrap(), &target).unwrap();
        let condition = node.children("conditions").unwrap()[0].as_node().unwrap();
        assert_eq!(condition.type_name(), "Condition");
        assert_eq!(condition.str_value("unit"), Some("degC"));
    }

    // ========================================================================
    // dereference
    // ========================================================================

    #[tokio::test]
    async fn test_dereference_fetches_remote_by_slug() {
        let gateway = OneRecord {
            url: GROUP,
            record: json!({"url": GROUP, "name": "polymer-lab"}),
        };
        let node = dereference(&Reference::Remote(GROUP.to_string()), &gateway)
            .await
            .unwrap();
        assert_eq!(node.type_name(), "Group");
        assert_eq!(node.url(), Some(GROUP));
    }

    #[tokio::test]
    async fn test_dereference_unknown_slug_is_invalid_url() {
        let gateway = OneRecord {
            url: GROUP,
            record: json!({}),
        };
        let err = dereference(
            &Reference::Remote("https://criptapp.org/api/widget/1/".to_string()),
            &gateway,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SyncError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_dereference_surfaces_gateway_errors() {
        let gateway = OneRecord {
            url: GROUP,
            record: json!({}),
        };
        let missing = "https://criptapp.org/api/group/2/";
        let err = dereference(&Reference::Remote(missing.to_string()), &gateway)
            .await
            .unwrap_err();
        assert_eq!(err, SyncError::Gateway(GatewayError::not_found(missing)));
    }

    #[tokio::test]
    async fn test_dereference_live_node_is_a_copy() {
        let gateway = OneRecord {
            url: GROUP,
            record: json!({}),
        };
        let reference = Reference::from(property());
        let node = dereference(&reference, &gateway).await.unwrap();
        assert_eq!(Some(&node), reference.as_node());
    }
}
