//! Configuration Management
//!
//! Handles persistent provider configuration: where the EDA API lives and how
//! to authenticate against it.

use crate::eda::auth::{Grant, DEFAULT_CLIENT_ID};
use crate::eda::client::EdaClient;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base URL used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://localhost:9443";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// EDA API base URL
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Keycloak client used for the password grant
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Pre-issued bearer token, used instead of the password grant
    #[serde(default)]
    pub token: Option<String>,
    /// Accept self-signed API certificates
    #[serde(default)]
    pub tls_skip_verify: bool,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("eda-services").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Overlay values from `EDA_*` environment variables
    pub fn with_env(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(v) = var("EDA_BASE_URL") {
            self.base_url = Some(v);
        }
        if let Some(v) = var("EDA_USERNAME") {
            self.username = Some(v);
        }
        if let Some(v) = var("EDA_PASSWORD") {
            self.password = Some(v);
        }
        if let Some(v) = var("EDA_CLIENT_SECRET") {
            self.client_secret = Some(v);
        }
        if let Some(v) = var("EDA_TOKEN") {
            self.token = Some(v);
        }
        self
    }

    /// Get effective base URL (config > default)
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Get effective OAuth client id (config > default)
    pub fn effective_client_id(&self) -> String {
        self.client_id
            .clone()
            .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string())
    }

    /// Authentication derived from the configured values: a token wins over
    /// username/password; neither means unauthenticated
    pub fn grant(&self) -> Grant {
        if let Some(token) = &self.token {
            return Grant::Token(token.clone());
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Grant::Password {
                token_url: EdaClient::token_url(&self.effective_base_url()),
                client_id: self.effective_client_id(),
                client_secret: self.client_secret.clone(),
                username: username.clone(),
                password: password.clone(),
            },
            _ => Grant::None,
        }
    }

    /// Build an API client from this configuration
    pub fn client(&self) -> Result<EdaClient> {
        EdaClient::new(&self.effective_base_url(), self.grant(), self.tls_skip_verify)
    }
}
