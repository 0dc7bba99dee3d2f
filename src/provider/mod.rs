//! Resource and data source handlers
//!
//! Thin glue between models and the EDA API: each operation runs the codec
//! passes around a single REST call.
//!
//! # Handlers
//!
//! - [`resource`] - managed resources (`irb_interface`)
//! - [`data_source`] - read-only lookups (`vlan`, `virtual_network`)
//!
//! # Example
//!
//! ```ignore
//! use eda_services::provider::DataSource;
//!
//! async fn read_vlan(client: EdaClient) -> anyhow::Result<Model> {
//!     let vlans = DataSource::vlan(client)?;
//!     let mut config = vlans.schema().null_model();
//!     config.set("namespace", Value::string("eda"));
//!     config.set("name", Value::string("vlan-100"));
//!     vlans.read(config).await
//! }
//! ```

pub mod data_source;
pub mod resource;

pub use data_source::DataSource;
pub use resource::ManagedResource;

use crate::codec::{string_value, Model};
use crate::schema::ResourceSchema;
use anyhow::Result;
use std::collections::BTreeMap;
use std::time::Instant;

/// `namespace` and `name` path parameters from the model's identity
/// attributes; both must be non-empty
pub(crate) fn identity_params(schema: &ResourceSchema, model: &Model) -> Result<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();
    for (key, path) in [
        ("namespace", &schema.identity.namespace),
        ("name", &schema.identity.name),
    ] {
        let value = model.get_path(path).map(string_value).unwrap_or_default();
        if value.is_empty() {
            anyhow::bail!("Missing required attribute '{}' for {}", path, schema.type_name);
        }
        params.insert(key.to_string(), value);
    }
    Ok(params)
}

pub(crate) fn log_request(operation: &str, path: &str, data: &serde_json::Value) {
    tracing::info!(path, data = %data, "{}::API request", operation);
}

pub(crate) fn log_result(
    operation: &str,
    path: &str,
    result: &Result<serde_json::Value>,
    started: Instant,
) {
    match result {
        Ok(value) => tracing::info!(
            path,
            result = %value,
            time_taken = ?started.elapsed(),
            "{}::API returned",
            operation
        ),
        Err(e) => tracing::warn!(
            path,
            error = %format!("{:#}", e),
            time_taken = ?started.elapsed(),
            "{}::API failed",
            operation
        ),
    }
}
