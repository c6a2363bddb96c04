//! Credential refresh.
//!
//! The HTTP provider posts the current token pair to the configured token
//! endpoint and reads a new pair back:
//!
//! ```json
//! {"id_token": "...", "refresh_token": "..."}
//! ```
//!
//! A response without a new refresh token keeps the old one.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tamagotchi_core::config::{BackendKind, RemoteConfig};
use tamagotchi_types::TokenSet;
use tracing::debug;

use crate::error::RemoteError;
use crate::http::{check, decode};

#[derive(Serialize)]
struct RefreshRequest<'a> {
    id_token: &'a str,
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Source of fresh credentials.
#[derive(Debug, Clone)]
pub enum AuthProvider {
    /// Refresh against an HTTP token endpoint.
    Http(HttpAuthProvider),
    /// Re-issue the same tokens. Used with the in-memory backend.
    Static,
}

impl AuthProvider {
    /// Build the provider matching the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        match config.backend {
            BackendKind::Http => Ok(Self::Http(HttpAuthProvider::new(config)?)),
            BackendKind::Memory => Ok(Self::Static),
        }
    }

    /// Exchange the given tokens for a new set.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the endpoint rejects the tokens or
    /// cannot be reached.
    pub async fn refresh_tokens(&self, tokens: &TokenSet) -> Result<TokenSet, RemoteError> {
        match self {
            Self::Http(provider) => provider.refresh_tokens(tokens).await,
            Self::Static => Ok(TokenSet::new(
                tokens.id_token.clone(),
                tokens.refresh_token.clone(),
            )),
        }
    }
}

/// Client for the token refresh endpoint.
#[derive(Debug, Clone)]
pub struct HttpAuthProvider {
    client: Client,
    auth_url: String,
}

impl HttpAuthProvider {
    /// Build a client for the configured token endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            auth_url: config.auth_url.clone(),
        })
    }

    async fn refresh_tokens(&self, tokens: &TokenSet) -> Result<TokenSet, RemoteError> {
        if tokens.refresh_token.is_empty() {
            return Err(RemoteError::Unauthorized {
                reason: String::from("no refresh token"),
            });
        }
        let response = self
            .client
            .post(&self.auth_url)
            .json(&RefreshRequest {
                id_token: &tokens.id_token,
                refresh_token: &tokens.refresh_token,
            })
            .send()
            .await?;
        let response = check(response, "refresh tokens").await?;
        let body: RefreshResponse = decode(response, "refresh tokens").await?;
        debug!("Token refresh succeeded");
        Ok(merge(tokens, body))
    }
}

fn merge(old: &TokenSet, body: RefreshResponse) -> TokenSet {
    let refresh_token = body
        .refresh_token
        .filter(|token| !token.is_empty())
        .unwrap_or_else(|| old.refresh_token.clone());
    TokenSet::new(body.id_token, refresh_token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_reissues_same_pair() {
        let old = TokenSet::new("id", "refresh");
        let new = AuthProvider::Static.refresh_tokens(&old).await.unwrap();
        assert_eq!(new.id_token, "id");
        assert_eq!(new.refresh_token, "refresh");
        assert!(new.issued_at >= old.issued_at);
    }

    #[test]
    fn response_without_refresh_token_keeps_old_one() {
        let old = TokenSet::new("id-1", "refresh-1");
        let body: RefreshResponse = serde_json::from_str(r#"{"id_token":"id-2"}"#).unwrap();
        let merged = merge(&old, body);
        assert_eq!(merged.id_token, "id-2");
        assert_eq!(merged.refresh_token, "refresh-1");
    }

    #[test]
    fn response_with_refresh_token_replaces_both() {
        let old = TokenSet::new("id-1", "refresh-1");
        let body: RefreshResponse =
            serde_json::from_str(r#"{"id_token":"id-2","refresh_token":"refresh-2"}"#).unwrap();
        let merged = merge(&old, body);
        assert_eq!(merged.refresh_token, "refresh-2");
    }

    #[test]
    fn request_body_field_names() {
        let body = serde_json::to_value(RefreshRequest {
            id_token: "a",
            refresh_token: "b",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"id_token": "a", "refresh_token": "b"}));
    }

    #[tokio::test]
    async fn missing_refresh_token_is_rejected() {
        let provider = HttpAuthProvider::new(&RemoteConfig::default()).unwrap();
        let result = provider.refresh_tokens(&TokenSet::new("id", "")).await;
        assert!(matches!(result, Err(RemoteError::Unauthorized { .. })));
    }
}
