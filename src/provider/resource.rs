//! Managed resources
//!
//! Create/Read/Update/Delete/Import for schemas of kind `resource`. Each
//! operation issues exactly one API call.

use super::{identity_params, log_request, log_result};
use crate::codec::{
    any_map_to_model, fill_missing_values, mapping_from_json, mapping_to_json, model_to_any_map,
    Model, Value,
};
use crate::eda::client::EdaClient;
use crate::schema::{get_schema, ResourceSchema, SchemaKind};
use anyhow::{Context, Result};
use std::time::Instant;

/// A resource type bound to an API client
#[derive(Clone)]
pub struct ManagedResource {
    schema: &'static ResourceSchema,
    client: EdaClient,
}

impl ManagedResource {
    pub fn new(schema: &'static ResourceSchema, client: EdaClient) -> Result<Self> {
        if schema.kind != SchemaKind::Resource {
            anyhow::bail!("'{}' is not a managed resource", schema.type_name);
        }
        Ok(Self { schema, client })
    }

    /// Look up a registered resource type
    pub fn by_name(type_name: &str, client: EdaClient) -> Result<Self> {
        let schema = get_schema(type_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown resource type: {}", type_name))?;
        Self::new(schema, client)
    }

    /// IRB interface resource
    pub fn irb_interface(client: EdaClient) -> Result<Self> {
        Self::by_name("irb_interface", client)
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    fn path<'a>(&self, template: &'a Option<String>, operation: &str) -> Result<&'a str> {
        template.as_deref().ok_or_else(|| {
            anyhow::anyhow!("'{}' does not support {}", self.schema.type_name, operation)
        })
    }

    /// Create from plan data, merging the API response into the plan
    pub async fn create(&self, mut plan: Model) -> Result<Model> {
        let path = self.path(&self.schema.api.create, "create")?;

        fill_missing_values(self.schema, &mut plan).context("Error filling missing values")?;
        let body = model_to_any_map(self.schema, &plan).context("Error building request")?;
        let body = mapping_to_json(&body);
        let params = identity_params(self.schema, &plan)?;

        log_request("Create()", path, &body);
        let t0 = Instant::now();
        let result = self.client.create(path, &params, &body).await;
        log_result("Create()", path, &result, t0);
        let result = result.context("Error creating resource")?;

        self.merge(result, plan)
    }

    /// Refresh prior state from the API
    pub async fn read(&self, state: Model) -> Result<Model> {
        let path = self.schema.api.read.as_str();
        let params = identity_params(self.schema, &state)?;

        log_request("Read()", path, &serde_json::Value::Null);
        let t0 = Instant::now();
        let result = self.client.get(path, &params).await;
        log_result("Read()", path, &result, t0);
        let result = result.context("Error reading resource")?;

        self.merge(result, state)
    }

    /// Replace the resource with plan data
    pub async fn update(&self, mut plan: Model) -> Result<Model> {
        let path = self.path(&self.schema.api.update, "update")?;

        fill_missing_values(self.schema, &mut plan).context("Error filling missing values")?;
        let body = model_to_any_map(self.schema, &plan).context("Error building request")?;
        let body = mapping_to_json(&body);
        let params = identity_params(self.schema, &plan)?;

        log_request("Update()", path, &body);
        let t0 = Instant::now();
        let result = self.client.update(path, &params, &body).await;
        log_result("Update()", path, &result, t0);
        let result = result.context("Error updating resource")?;

        self.merge(result, plan)
    }

    /// Delete the resource named by prior state
    pub async fn delete(&self, state: &Model) -> Result<()> {
        let path = self.path(&self.schema.api.delete, "delete")?;
        let params = identity_params(self.schema, state)?;

        log_request("Delete()", path, &serde_json::Value::Null);
        let t0 = Instant::now();
        let result = self.client.delete(path, &params).await;
        log_result("Delete()", path, &result, t0);
        result.context("Error deleting resource")?;

        Ok(())
    }

    /// State for an import ID of the form `<namespace>/<name>`, ready for
    /// [`read`](Self::read)
    pub fn import_state(&self, id: &str) -> Result<Model> {
        let (namespace, name) = match id.split('/').collect::<Vec<_>>().as_slice() {
            [namespace, name] if !namespace.is_empty() && !name.is_empty() => (*namespace, *name),
            _ => anyhow::bail!("Invalid ID: expected <namespace>/<name> format, got: {}", id),
        };

        let mut state = self.schema.null_model();
        let identity = &self.schema.identity;
        if !state.set_path(&identity.namespace, Value::string(namespace))
            || !state.set_path(&identity.name, Value::string(name))
        {
            anyhow::bail!("Cannot set identity of '{}'", self.schema.type_name);
        }
        Ok(state)
    }

    fn merge(&self, result: serde_json::Value, mut model: Model) -> Result<Model> {
        let response = mapping_from_json(&result).context("Failed to build response from API result")?;
        any_map_to_model(self.schema, &response, &mut model)
            .context("Failed to build response from API result")?;
        Ok(model)
    }
}
