//! EDA Client
//!
//! Main client for the EDA services API, combining authentication, HTTP and
//! path templating. Handed to each resource at construction; there is no
//! process-wide instance.

use super::auth::{EdaCredentials, Grant};
use super::http::EdaHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// Main EDA client
#[derive(Clone)]
pub struct EdaClient {
    pub credentials: EdaCredentials,
    pub http: EdaHttpClient,
    pub base_url: Url,
}

impl EdaClient {
    /// Create a new EDA client
    pub fn new(base_url: &str, grant: Grant, tls_skip_verify: bool) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid EDA base URL: {}", base_url))?;
        let http = EdaHttpClient::new(tls_skip_verify)?;
        let credentials = EdaCredentials::new(grant, http.inner().clone());

        Ok(Self {
            credentials,
            http,
            base_url,
        })
    }

    /// Keycloak token URL for a base URL
    pub fn token_url(base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), super::auth::TOKEN_PATH)
    }

    /// Build a request URL from a path template such as
    /// `/apps/services.eda.nokia.com/v1/namespaces/{namespace}/vlans/{name}`
    pub fn url_for(
        &self,
        template: &str,
        path_params: &BTreeMap<String, String>,
        query: &BTreeMap<String, String>,
    ) -> Result<Url> {
        let path = expand_path(template, path_params)?;
        let mut url = Url::parse(&format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        ))
        .with_context(|| format!("Invalid request path: {}", path))?;

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        Ok(url)
    }

    /// Create a resource (POST)
    pub async fn create(
        &self,
        template: &str,
        path_params: &BTreeMap<String, String>,
        body: &Value,
    ) -> Result<Value> {
        let url = self.url_for(template, path_params, &BTreeMap::new())?;
        let token = self.credentials.get_token().await?;
        self.http.post(&url, token.as_deref(), body).await
    }

    /// Get a resource (GET)
    pub async fn get(&self, template: &str, path_params: &BTreeMap<String, String>) -> Result<Value> {
        self.get_by_query(template, path_params, &BTreeMap::new()).await
    }

    /// Replace a resource (PUT)
    pub async fn update(
        &self,
        template: &str,
        path_params: &BTreeMap<String, String>,
        body: &Value,
    ) -> Result<Value> {
        let url = self.url_for(template, path_params, &BTreeMap::new())?;
        let token = self.credentials.get_token().await?;
        self.http.put(&url, token.as_deref(), body).await
    }

    /// Delete a resource (DELETE)
    pub async fn delete(&self, template: &str, path_params: &BTreeMap<String, String>) -> Result<Value> {
        let url = self.url_for(template, path_params, &BTreeMap::new())?;
        let token = self.credentials.get_token().await?;
        self.http.delete(&url, token.as_deref()).await
    }

    /// Get with query parameters (GET)
    pub async fn get_by_query(
        &self,
        template: &str,
        path_params: &BTreeMap<String, String>,
        query: &BTreeMap<String, String>,
    ) -> Result<Value> {
        let url = self.url_for(template, path_params, query)?;
        let token = self.credentials.get_token().await?;
        self.http.get(&url, token.as_deref()).await
    }
}

/// Substitute `{param}` placeholders with percent-encoded values
fn expand_path(template: &str, params: &BTreeMap<String, String>) -> Result<String> {
    let mut path = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let end = rest[start..]
            .find('}')
            .map(|i| start + i)
            .ok_or_else(|| anyhow::anyhow!("Unclosed placeholder in path template: {}", template))?;
        let name = &rest[start + 1..end];

        let value = params
            .get(name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing path parameter '{}' for {}", name, template))?;

        path.push_str(&rest[..start]);
        path.push_str(&urlencoding::encode(value));
        rest = &rest[end + 1..];
    }
    path.push_str(rest);

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_expand_path() {
        let path = expand_path(
            "/apps/services.eda.nokia.com/v1/namespaces/{namespace}/vlans/{name}",
            &params(&[("namespace", "eda"), ("name", "vlan 1")]),
        )
        .unwrap();
        assert_eq!(path, "/apps/services.eda.nokia.com/v1/namespaces/eda/vlans/vlan%201");
    }

    #[test]
    fn test_expand_path_encodes_slashes() {
        let path = expand_path("/things/{name}", &params(&[("name", "a/b")])).unwrap();
        assert_eq!(path, "/things/a%2Fb");
    }

    #[test]
    fn test_expand_path_rejects_missing_or_empty() {
        assert!(expand_path("/things/{name}", &params(&[])).is_err());
        assert!(expand_path("/things/{name}", &params(&[("name", "")])).is_err());
        assert!(expand_path("/things/{name", &params(&[("name", "x")])).is_err());
    }

    #[test]
    fn test_url_for_keeps_base_path_and_adds_query() {
        let client = EdaClient::new("https://eda.example.com/", Grant::None, false).unwrap();
        let url = client
            .url_for(
                "/apps/v1/namespaces/{namespace}/vlans",
                &params(&[("namespace", "eda")]),
                &params(&[("labelselector", "role=edge")]),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://eda.example.com/apps/v1/namespaces/eda/vlans?labelselector=role%3Dedge"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(EdaClient::new("not a url", Grant::None, false).is_err());
    }

    #[test]
    fn test_token_url() {
        assert_eq!(
            EdaClient::token_url("https://eda.example.com/"),
            "https://eda.example.com/core/httpproxy/v1/keycloak/realms/eda/protocol/openid-connect/token"
        );
    }
}
