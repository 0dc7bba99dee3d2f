//! Schema Registry - Load resource schemas from JSON
//!
//! This module loads every resource and data source schema from embedded JSON
//! files and provides lookup functions for the rest of the application.

use super::ResourceSchema;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded schema JSON files (compiled into the binary)
const SCHEMA_FILES: &[&str] = &[
    include_str!("../resources/irb_interface.json"),
    include_str!("../resources/vlan.json"),
    include_str!("../resources/virtual_network.json"),
];

/// Global registry loaded from JSON
static REGISTRY: OnceLock<HashMap<String, ResourceSchema>> = OnceLock::new();

/// Get the schema registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static HashMap<String, ResourceSchema> {
    REGISTRY.get_or_init(|| {
        let mut registry = HashMap::new();

        for content in SCHEMA_FILES {
            let schema: ResourceSchema = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded schema JSON: {}", e));
            if let Err(e) = schema.validate() {
                panic!("Invalid embedded schema '{}': {}", schema.type_name, e);
            }
            registry.insert(schema.type_name.clone(), schema);
        }

        registry
    })
}

/// Get a schema by type name
pub fn get_schema(type_name: &str) -> Option<&'static ResourceSchema> {
    get_registry().get(type_name)
}

/// Get all registered type names, sorted
pub fn get_all_type_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = get_registry().keys().map(|s| s.as_str()).collect();
    names.sort_unstable();
    names
}
