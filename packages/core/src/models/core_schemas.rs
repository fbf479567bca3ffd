//! Core Schema Definitions
//!
//! Canonical definitions of every node type the client understands.
//!
//! ## Primary types (saved independently, addressed by URL)
//!
//! - **Group** / **User** - ownership and membership
//! - **Collection** / **Experiment** - project structure
//! - **Material** / **Identity** - chemistry
//! - **Process** - how a material was made
//! - **Data** / **File** - measurements and their files
//! - **Reference** - literature
//!
//! ## Secondary types (always embedded in an owner)
//!
//! - **Property** / **Condition** / **Quantity** - keyed `(key, value, unit)` triples
//! - **MaterialComponent**, **Procedure**, **ProductIngredient**,
//!   **MaterialIngredient**, **Citation**
//!
//! ## Usage
//!
//! Call `get_core_schemas()` to get all definitions; the node registry loads
//! them once on first use.

use crate::models::schema::{FieldSpec, KeyedFields, NodeSchema, RefTarget, RoutedCollection};
use serde_json::json;

/// Fields every owned primary node carries
fn owned(mut fields: Vec<FieldSpec>) -> Vec<FieldSpec> {
    let mut all = vec![FieldSpec::reference("group", RefTarget::one("Group")).required()];
    all.append(&mut fields);
    all.push(FieldSpec::boolean("public").with_default(json!(false)));
    all
}

fn ingredient_target() -> RefTarget {
    RefTarget::union(&[
        ("procedure_id", "ProductIngredient"),
        ("ingredient", "MaterialIngredient"),
    ])
}

/// Get all core schema definitions
pub fn get_core_schemas() -> Vec<NodeSchema> {
    vec![
        NodeSchema::primary(
            "Group",
            "group",
            vec![
                FieldSpec::string("name").required(),
                FieldSpec::collection("users", RefTarget::one("User")),
                FieldSpec::boolean("public").with_default(json!(false)),
            ],
        ),
        NodeSchema::primary(
            "User",
            "user",
            vec![
                FieldSpec::string("username").required(),
                FieldSpec::string("email").required(),
                FieldSpec::string("phone"),
                FieldSpec::string("website"),
                FieldSpec::string("twitter"),
                FieldSpec::string("orcid"),
                FieldSpec::string("organization"),
                FieldSpec::string("position"),
                FieldSpec::collection("groups", RefTarget::one("Group")),
            ],
        ),
        NodeSchema::primary(
            "Reference",
            "reference",
            owned(vec![
                FieldSpec::string("title").required(),
                FieldSpec::string_list("authors").with_default(json!([])),
                FieldSpec::string("journal"),
                FieldSpec::string("publisher"),
                FieldSpec::integer("year"),
                FieldSpec::integer("volume"),
                FieldSpec::integer("issue"),
                FieldSpec::string("pages"),
                FieldSpec::string("doi"),
                FieldSpec::string("issn"),
                FieldSpec::string("arxiv_id"),
                FieldSpec::integer("pmid"),
                FieldSpec::string("website"),
                FieldSpec::string("notes"),
            ]),
        ),
        NodeSchema::primary(
            "File",
            "file",
            owned(vec![
                FieldSpec::string("source").required(),
                FieldSpec::string("type")
                    .with_default(json!("data"))
                    .bound_to("file-type"),
                FieldSpec::string("name"),
                FieldSpec::string("checksum"),
                FieldSpec::string("extension"),
                FieldSpec::string("external_source"),
                FieldSpec::collection("data", RefTarget::one("Data")),
            ]),
        ),
        NodeSchema::primary(
            "Data",
            "data",
            owned(vec![
                FieldSpec::string("name").required(),
                FieldSpec::string("type").required().bound_to("data-type"),
                FieldSpec::collection("files", RefTarget::one("File")),
                FieldSpec::string("sample_prep"),
                FieldSpec::string("notes"),
            ]),
        ),
        NodeSchema::primary(
            "Collection",
            "collection",
            owned(vec![
                FieldSpec::string("name").required(),
                FieldSpec::collection("experiments", RefTarget::one("Experiment")),
                FieldSpec::collection("citations", RefTarget::one("Citation")),
                FieldSpec::string("notes"),
            ]),
        ),
        NodeSchema::primary(
            "Experiment",
            "experiment",
            owned(vec![
                FieldSpec::reference("collection", RefTarget::one("Collection")).required(),
                FieldSpec::string("name").required(),
                FieldSpec::string("funding"),
                FieldSpec::reference("process", RefTarget::one("Process")),
                FieldSpec::reference("product", RefTarget::one("Material")),
                FieldSpec::collection("data", RefTarget::one("Data")),
                FieldSpec::string("notes"),
            ]),
        ),
        NodeSchema::primary(
            "Identity",
            "identity",
            owned(vec![
                FieldSpec::string("name").required(),
                FieldSpec::string_list("names").with_default(json!([])),
                FieldSpec::string("cas"),
                FieldSpec::string("smiles"),
                FieldSpec::string("bigsmiles"),
                FieldSpec::string("chem_formula"),
                FieldSpec::string("chem_repeat"),
                FieldSpec::string("pubchem_cid"),
                FieldSpec::string("inchi"),
                FieldSpec::string("inchi_key"),
            ]),
        ),
        NodeSchema::primary(
            "Material",
            "material",
            owned(vec![
                FieldSpec::string("name").required(),
                FieldSpec::collection("components", RefTarget::one("MaterialComponent")),
                FieldSpec::string_list("keywords")
                    .with_default(json!([]))
                    .bound_to("material-keyword"),
                FieldSpec::string("source"),
                FieldSpec::string("lot_number"),
                FieldSpec::collection("properties", RefTarget::one("Property")),
                FieldSpec::collection("conditions", RefTarget::one("Condition")),
                FieldSpec::collection("citations", RefTarget::one("Citation")),
                FieldSpec::string("notes"),
            ]),
        ),
        NodeSchema::primary(
            "Process",
            "process",
            owned(vec![
                FieldSpec::string("name").required(),
                FieldSpec::string_list("keywords")
                    .with_default(json!([]))
                    .bound_to("process-keyword"),
                FieldSpec::collection("procedures", RefTarget::one("Procedure")),
                FieldSpec::collection("properties", RefTarget::one("Property")),
                FieldSpec::collection("conditions", RefTarget::one("Condition")),
                FieldSpec::collection("citations", RefTarget::one("Citation")),
                FieldSpec::string("notes"),
            ]),
        ),
        // Secondary types
        NodeSchema::secondary(
            "Citation",
            vec![
                FieldSpec::reference("reference", RefTarget::one("Reference")).required(),
                FieldSpec::string("type")
                    .with_default(json!("reference"))
                    .bound_to("citation-type"),
                FieldSpec::string("notes"),
            ],
        ),
        NodeSchema::secondary(
            "MaterialComponent",
            vec![
                FieldSpec::reference("component", RefTarget::one("Identity")).required(),
                FieldSpec::integer("component_id").with_default(json!(0)),
            ],
        ),
        NodeSchema::secondary(
            "Condition",
            vec![
                FieldSpec::string("key").required(),
                FieldSpec::any("value"),
                FieldSpec::string("unit"),
                FieldSpec::number("uncertainty"),
                FieldSpec::string("uncertainty_type"),
                FieldSpec::collection("data", RefTarget::one("Data")),
            ],
        )
        .with_keyed(KeyedFields::standard("condition-key")),
        NodeSchema::secondary(
            "Property",
            vec![
                FieldSpec::string("key").required(),
                FieldSpec::any("value"),
                FieldSpec::string("unit"),
                FieldSpec::string("method"),
                FieldSpec::number("uncertainty"),
                FieldSpec::string("uncertainty_type"),
                FieldSpec::collection("components", RefTarget::one("MaterialComponent")),
                FieldSpec::collection("conditions", RefTarget::one("Condition")),
                FieldSpec::collection("data", RefTarget::one("Data")),
                FieldSpec::collection("citations", RefTarget::one("Citation")),
            ],
        )
        .with_keyed(KeyedFields::standard("property-key")),
        NodeSchema::secondary(
            "Quantity",
            vec![
                FieldSpec::string("key").required(),
                FieldSpec::any("value").required(),
                FieldSpec::string("unit"),
                FieldSpec::number("uncertainty"),
            ],
        )
        .with_keyed(KeyedFields::standard("quantity-key")),
        NodeSchema::secondary(
            "ProductIngredient",
            vec![
                FieldSpec::integer("procedure_id").required(),
                FieldSpec::string("keyword")
                    .required()
                    .bound_to("ingredient-keyword"),
                FieldSpec::string("method"),
                FieldSpec::collection("quantities", RefTarget::one("Quantity")),
            ],
        ),
        NodeSchema::secondary(
            "MaterialIngredient",
            vec![
                FieldSpec::reference("ingredient", RefTarget::one("Material")).required(),
                FieldSpec::string("keyword")
                    .required()
                    .bound_to("ingredient-keyword"),
                FieldSpec::string("method"),
                FieldSpec::collection("quantities", RefTarget::one("Quantity")),
            ],
        ),
        NodeSchema::secondary(
            "Procedure",
            vec![
                FieldSpec::integer("procedure_id").required(),
                FieldSpec::string("description"),
                FieldSpec::collection(
                    "product_ingredients",
                    RefTarget::one("ProductIngredient"),
                ),
                FieldSpec::collection(
                    "material_ingredients",
                    RefTarget::one("MaterialIngredient"),
                ),
                FieldSpec::collection("properties", RefTarget::one("Property")),
                FieldSpec::collection("conditions", RefTarget::one("Condition")),
            ],
        )
        .with_routed(RoutedCollection {
            name: "ingredients",
            target: ingredient_target(),
            routes: vec![
                ("ProductIngredient", "product_ingredients"),
                ("MaterialIngredient", "material_ingredients"),
            ],
        }),
    ]
}
