//! EDA Authentication
//!
//! Handles bearer tokens for the EDA API: either a token supplied up front,
//! or one obtained from the EDA Keycloak realm with a password grant and
//! cached until shortly before it expires.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Keycloak token endpoint, relative to the EDA base URL
pub const TOKEN_PATH: &str = "/core/httpproxy/v1/keycloak/realms/eda/protocol/openid-connect/token";

/// Default OAuth client registered for API access
pub const DEFAULT_CLIENT_ID: &str = "eda";

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(30);

/// Token TTL if the token endpoint doesn't say (conservative: 5 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

/// How a token is obtained
#[derive(Clone)]
pub enum Grant {
    /// No authentication
    None,
    /// Fixed bearer token
    Token(String),
    /// Resource-owner password grant against Keycloak
    Password {
        token_url: String,
        client_id: String,
        client_secret: Option<String>,
        username: String,
        password: String,
    },
}

impl std::fmt::Debug for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Security: never print secrets
        match self {
            Grant::None => f.write_str("None"),
            Grant::Token(_) => f.write_str("Token(***)"),
            Grant::Password {
                token_url,
                client_id,
                username,
                ..
            } => f
                .debug_struct("Password")
                .field("token_url", token_url)
                .field("client_id", client_id)
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// EDA credentials holder with token caching
#[derive(Clone)]
pub struct EdaCredentials {
    grant: Grant,
    http: Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    /// Check if this cached token is still valid
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl EdaCredentials {
    pub fn new(grant: Grant, http: Client) -> Self {
        Self {
            grant,
            http,
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    /// Get an access token for API calls, or `None` when unauthenticated
    /// Security: Checks token expiry before returning cached token
    pub async fn get_token(&self) -> Result<Option<String>> {
        let (token_url, client_id, client_secret, username, password) = match &self.grant {
            Grant::None => return Ok(None),
            Grant::Token(token) => return Ok(Some(token.clone())),
            Grant::Password {
                token_url,
                client_id,
                client_secret,
                username,
                password,
            } => (token_url, client_id, client_secret, username, password),
        };

        // Check cache first - but only return if token is still valid
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(Some(cached.token.clone()));
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let mut form = vec![
            ("grant_type", "password"),
            ("client_id", client_id.as_str()),
            ("username", username.as_str()),
            ("password", password.as_str()),
            ("scope", "openid"),
        ];
        if let Some(secret) = client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http
            .post(token_url)
            .form(&form)
            .send()
            .await
            .context("Failed to reach token endpoint")?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Token request failed: {}", status);
            return Err(anyhow::anyhow!("Token request failed: {}", status));
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.access_token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{}s",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs()
        );

        Ok(Some(token.access_token))
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token().await
    }
}
