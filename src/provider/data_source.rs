//! Read-only data sources

use super::{identity_params, log_request, log_result};
use crate::codec::{any_map_to_model, mapping_from_json, model_to_string_map, Model};
use crate::eda::client::EdaClient;
use crate::schema::{get_schema, ResourceSchema, SchemaKind};
use anyhow::{Context, Result};
use std::time::Instant;

/// A data source type bound to an API client
#[derive(Clone)]
pub struct DataSource {
    schema: &'static ResourceSchema,
    client: EdaClient,
}

impl DataSource {
    pub fn new(schema: &'static ResourceSchema, client: EdaClient) -> Result<Self> {
        if schema.kind != SchemaKind::DataSource {
            anyhow::bail!("'{}' is not a data source", schema.type_name);
        }
        Ok(Self { schema, client })
    }

    /// Look up a registered data source type
    pub fn by_name(type_name: &str, client: EdaClient) -> Result<Self> {
        let schema = get_schema(type_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown data source type: {}", type_name))?;
        Self::new(schema, client)
    }

    pub fn vlan(client: EdaClient) -> Result<Self> {
        Self::by_name("vlan", client)
    }

    pub fn virtual_network(client: EdaClient) -> Result<Self> {
        Self::by_name("virtual_network", client)
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    /// Look up the object named by `config` and merge it in
    pub async fn read(&self, mut config: Model) -> Result<Model> {
        let path = self.schema.api.read.as_str();

        let mut query = model_to_string_map(self.schema, &config)
            .context("Error extracting query params")?;
        let params = identity_params(self.schema, &config)?;
        // identity travels in the path
        for key in [&self.schema.identity.namespace, &self.schema.identity.name] {
            query.remove(key.as_str());
        }

        log_request("Read()", path, &serde_json::json!({ "query": query }));
        let t0 = Instant::now();
        let result = self.client.get_by_query(path, &params, &query).await;
        log_result("Read()", path, &result, t0);
        let result = result.context("Error reading resource")?;

        let response = mapping_from_json(&result).context("Failed to build response from API result")?;
        any_map_to_model(self.schema, &response, &mut config)
            .context("Failed to build response from API result")?;
        Ok(config)
    }
}
