//! HTTP utilities for EDA REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde_json::Value;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// HTTP client wrapper for EDA API calls
#[derive(Clone)]
pub struct EdaHttpClient {
    client: Client,
}

impl EdaHttpClient {
    /// Create a new HTTP client
    pub fn new(tls_skip_verify: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("eda-services/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(tls_skip_verify)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Underlying client, shared with the token fetcher
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Make a GET request to the EDA API
    pub async fn get(&self, url: &Url, token: Option<&str>) -> Result<Value> {
        self.send(Method::GET, url, token, None).await
    }

    /// Make a POST request to the EDA API
    pub async fn post(&self, url: &Url, token: Option<&str>, body: &Value) -> Result<Value> {
        self.send(Method::POST, url, token, Some(body)).await
    }

    /// Make a PUT request to the EDA API
    pub async fn put(&self, url: &Url, token: Option<&str>, body: &Value) -> Result<Value> {
        self.send(Method::PUT, url, token, Some(body)).await
    }

    /// Make a DELETE request to the EDA API
    pub async fn delete(&self, url: &Url, token: Option<&str>) -> Result<Value> {
        self.send(Method::DELETE, url, token, None).await
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!("{} {} [request {}]", method, url, request_id);

        let mut request = self
            .client
            .request(method, url.clone())
            .header("X-Request-Id", &request_id);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} - {} [request {}]",
                status,
                sanitize_for_log(&response_body),
                request_id
            );
            return Err(anyhow::anyhow!("API request failed: {}", status));
        }

        // Handle empty response
        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body).context("Failed to parse response JSON")
    }
}

/// Format an EDA API error for display
pub fn format_eda_error(error: &anyhow::Error) -> String {
    let error_str = format!("{:#}", error);

    if error_str.contains("401") {
        return "Authentication failed. Check the EDA username, password or token.".to_string();
    }
    if error_str.contains("403") {
        return "Permission denied. Check the EDA user's role bindings.".to_string();
    }
    if error_str.contains("404") {
        return "Resource not found.".to_string();
    }
    if error_str.contains("409") {
        return "Resource conflict. The resource may already exist or be in use.".to_string();
    }
    if error_str.contains("422") || error_str.contains("400") {
        return "Invalid request. The API rejected the resource definition.".to_string();
    }
    if error_str.contains("500") || error_str.contains("503") {
        return "EDA API temporarily unavailable. Please try again.".to_string();
    }

    error_str
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = "é".repeat(150);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
    }

    #[test]
    fn test_sanitize_drops_control_characters() {
        assert_eq!(sanitize_for_log("line1\nline2\r\t"), "line1line2");
    }

    #[test]
    fn test_format_eda_error() {
        let err = anyhow::anyhow!("API request failed: 404 Not Found");
        assert_eq!(format_eda_error(&err), "Resource not found.");

        let err = anyhow::anyhow!("API request failed: 401 Unauthorized");
        assert!(format_eda_error(&err).starts_with("Authentication failed"));

        let err = anyhow::anyhow!("connection refused");
        assert_eq!(format_eda_error(&err), "connection refused");
    }
}
