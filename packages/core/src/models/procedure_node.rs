//! Procedure Node Wrapper
//!
//! Typed view of a `Procedure`, the secondary node describing one step of a
//! process. Ingredients go through the routed `ingredients` collection:
//! a `ProductIngredient` (carries `procedure_id`) lands in
//! `product_ingredients`, a `MaterialIngredient` (carries `ingredient`) lands
//! in `material_ingredients`.

use crate::models::{Node, NodeError, Reference};
use crate::operations::ChildSelector;

pub const PROCEDURE_TYPE: &str = "Procedure";
pub const INGREDIENTS: &str = "ingredients";

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureNode {
    node: Node,
}

impl ProcedureNode {
    /// New procedure step with the given position id
    pub fn new(procedure_id: i64) -> Result<Self, NodeError> {
        Self::from_node(
            Node::builder(PROCEDURE_TYPE)
                .set("procedure_id", procedure_id)
                .build()?,
        )
    }

    /// # Errors
    ///
    /// Returns `NodeError::TypeMismatch` if the node is not a Procedure.
    pub fn from_node(node: Node) -> Result<Self, NodeError> {
        if node.type_name() != PROCEDURE_TYPE {
            return Err(NodeError::type_mismatch(
                "node",
                PROCEDURE_TYPE,
                node.type_name(),
            ));
        }
        Ok(Self { node })
    }

    pub fn as_node(&self) -> &Node {
        &self.node
    }

    pub fn as_node_mut(&mut self) -> &mut Node {
        &mut self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn procedure_id(&self) -> Option<i64> {
        self.node.value("procedure_id").and_then(|v| v.as_i64())
    }

    pub fn description(&self) -> Option<&str> {
        self.node.str_value("description")
    }

    /// Add a product or material ingredient; raw mappings are discriminated
    /// by their `procedure_id` / `ingredient` key
    pub fn add_ingredient(&mut self, ingredient: impl Into<Reference>) -> Result<(), NodeError> {
        self.node.add_child(INGREDIENTS, ingredient)
    }

    /// Remove an ingredient by node or URL (index removal is ambiguous here)
    pub fn remove_ingredient<'a>(
        &mut self,
        selector: impl Into<ChildSelector<'a>>,
    ) -> Result<Reference, NodeError> {
        self.node.remove_child(INGREDIENTS, selector)
    }

    pub fn product_ingredients(&self) -> &[Reference] {
        self.node.children("product_ingredients").unwrap_or_default()
    }

    pub fn material_ingredients(&self) -> &[Reference] {
        self.node.children("material_ingredients").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MATERIAL: &str = "https://criptapp.org/api/material/3/";

    #[test]
    fn test_raw_ingredients_are_routed_by_discriminator() {
        let mut procedure = ProcedureNode::new(1).unwrap();

        let product = json!({"procedure_id": 0, "keyword": "product"});
        let material = json!({"ingredient": MATERIAL, "keyword": "monomer"});
        procedure
            .add_ingredient(product.as_object().unwrap().clone())
            .unwrap();
        procedure
            .add_ingredient(material.as_object().unwrap().clone())
            .unwrap();

        assert_eq!(procedure.product_ingredients().len(), 1);
        assert_eq!(procedure.material_ingredients().len(), 1);
        let ingredient = procedure.material_ingredients()[0].as_node().unwrap();
        assert_eq!(ingredient.type_name(), "MaterialIngredient");
        assert_eq!(ingredient.reference("ingredient").unwrap().url(), Some(MATERIAL));
    }

    #[test]
    fn test_undiscriminated_mapping_is_rejected() {
        let mut procedure = ProcedureNode::new(1).unwrap();
        let unknown = json!({"keyword": "solvent"});
        let err = procedure
            .add_ingredient(unknown.as_object().unwrap().clone())
            .unwrap_err();
        assert!(matches!(err, NodeError::TypeMismatch { .. }));
        assert!(procedure.product_ingredients().is_empty());
        assert!(procedure.material_ingredients().is_empty());
    }

    #[test]
    fn test_remove_ingredient_routes_by_type() {
        let mut procedure = ProcedureNode::new(2).unwrap();
        let ingredient = Node::builder("MaterialIngredient")
            .set("ingredient", MATERIAL)
            .set("keyword", "monomer")
            .build()
            .unwrap();
        procedure.add_ingredient(ingredient.clone()).unwrap();

        let removed = procedure.remove_ingredient(&ingredient).unwrap();
        assert_eq!(removed.as_node(), Some(&ingredient));
        assert!(procedure.material_ingredients().is_empty());
    }

    #[test]
    fn test_remove_ingredient_by_index_is_ambiguous() {
        let mut procedure = ProcedureNode::new(2).unwrap();
        assert!(matches!(
            procedure.remove_ingredient(0usize),
            Err(NodeError::AmbiguousIndex { .. })
        ));
    }

    #[test]
    fn test_remote_ingredient_is_rejected() {
        let mut procedure = ProcedureNode::new(2).unwrap();
        assert!(matches!(
            procedure.add_ingredient(MATERIAL),
            Err(NodeError::TypeMismatch { .. })
        ));
    }
}
