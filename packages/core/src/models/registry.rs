//! Node Type Registry
//!
//! Maps type names and URL slugs to their [`NodeSchema`]. The core schemas are
//! loaded once into a process-wide registry; schemas are immutable data, so
//! sharing them is safe (unlike vocabulary, which is per session).

use crate::models::core_schemas::get_core_schemas;
use crate::models::schema::NodeSchema;
use crate::models::NodeError;
use std::collections::HashMap;
use std::sync::OnceLock;

static REGISTRY: OnceLock<NodeRegistry> = OnceLock::new();

/// Lookup table of node schemas
#[derive(Debug, Default)]
pub struct NodeRegistry {
    schemas: Vec<NodeSchema>,
    by_name: HashMap<&'static str, usize>,
    by_slug: HashMap<&'static str, usize>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSchema` if the type name or slug is already taken.
    pub fn register(&mut self, schema: NodeSchema) -> Result<(), NodeError> {
        if self.by_name.contains_key(schema.type_name) {
            return Err(NodeError::DuplicateSchema(schema.type_name.to_string()));
        }
        if let Some(slug) = schema.slug {
            if self.by_slug.contains_key(slug) {
                return Err(NodeError::DuplicateSchema(slug.to_string()));
            }
            self.by_slug.insert(slug, self.schemas.len());
        }
        self.by_name.insert(schema.type_name, self.schemas.len());
        self.schemas.push(schema);
        Ok(())
    }

    /// Registry holding all core schemas
    pub fn with_core_schemas() -> Result<Self, NodeError> {
        let mut registry = Self::new();
        for schema in get_core_schemas() {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Schema by type name
    pub fn get(&self, type_name: &str) -> Option<&NodeSchema> {
        self.by_name.get(type_name).map(|&i| &self.schemas[i])
    }

    /// Schema by type name, as an error when absent
    pub fn require(&self, type_name: &str) -> Result<&NodeSchema, NodeError> {
        self.get(type_name)
            .ok_or_else(|| NodeError::UnknownNodeType(type_name.to_string()))
    }

    /// Primary schema by URL slug
    pub fn by_slug(&self, slug: &str) -> Option<&NodeSchema> {
        self.by_slug.get(slug).map(|&i| &self.schemas[i])
    }

    /// Primary schema addressed by a node URL
    pub fn for_url(&self, url: &str) -> Option<&NodeSchema> {
        slug_from_url(url).and_then(|slug| self.by_slug(slug))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &NodeSchema> {
        self.schemas.iter()
    }
}

/// The process-wide registry of core schemas
pub fn registry() -> &'static NodeRegistry {
    REGISTRY.get_or_init(|| match NodeRegistry::with_core_schemas() {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("Core schema registration failed: {}", e);
            NodeRegistry::new()
        }
    })
}

/// Slug of a node URL: the second-to-last path segment
///
/// `https://host/api/material/42/` yields `material`.
pub fn slug_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let mut segments = path.trim_end_matches('/').rsplit('/');
    segments.next()?;
    segments.next().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads_core_schemas() {
        let registry = registry();
        assert_eq!(registry.schemas().count(), 18);
        assert_eq!(registry.get("Material").unwrap().slug, Some("material"));
        assert_eq!(registry.by_slug("process").unwrap().type_name, "Process");
        assert!(registry.by_slug("property").is_none());
    }

    #[test]
    fn test_register_rejects_duplicate_slug() {
        let mut registry = NodeRegistry::with_core_schemas().unwrap();
        let clash = NodeSchema::primary("Sample", "material", vec![]);
        assert_eq!(
            registry.register(clash),
            Err(NodeError::DuplicateSchema("material".to_string()))
        );
    }

    #[test]
    fn test_slug_from_url() {
        assert_eq!(
            slug_from_url("https://cript.org/api/material/42/"),
            Some("material")
        );
        assert_eq!(slug_from_url("https://cript.org/api/data/7"), Some("data"));
        assert_eq!(slug_from_url("42"), None);
    }

    #[test]
    fn test_for_url_unknown_slug() {
        assert!(registry().for_url("https://cript.org/api/widget/1/").is_none());
        assert_eq!(
            registry()
                .for_url("https://cript.org/api/experiment/1/")
                .map(|s| s.type_name),
            Some("Experiment")
        );
    }
}
