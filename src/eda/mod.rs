//! EDA API interaction module
//!
//! This module provides the REST side of the provider: authentication, the
//! HTTP client, and the path-templated client that resources call.
//!
//! # Module Structure
//!
//! - [`auth`] - Static tokens and Keycloak password grants
//! - [`client`] - Main EDA client for Create/Get/Update/Delete/GetByQuery
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use eda_services::eda::{auth::Grant, client::EdaClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = EdaClient::new("https://eda.example.com", Grant::None, false)?;
//!     let params = [("namespace".to_string(), "eda".to_string())].into();
//!     let vlans = client.get("/apps/services.eda.nokia.com/v1/namespaces/{namespace}/vlans", &params).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
