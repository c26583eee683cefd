//! Google OAuth2 authorization-code flow

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use mailgen_core::{Identity, RefreshedTokens};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{GoogleConfig, SCOPES};
use crate::auth_broker::IdentityProvider;
use crate::error::BrokerError;

/// Token endpoint response for an authorization-code grant
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// OpenID Connect userinfo
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Google OAuth2 client for the web-server flow
#[derive(Clone)]
pub struct GoogleOAuth {
    config: GoogleConfig,
    http_client: Client,
}

impl GoogleOAuth {
    pub fn new(config: GoogleConfig) -> Result<Self, BrokerError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BrokerError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Google normally omits `refresh_token` here; callers merge the result
    /// with [`Identity::apply_refresh`] so the stored one survives.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, BrokerError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BrokerError::from_response("Token refresh failed", response).await);
        }

        Ok(response.json().await?)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserInfo, BrokerError> {
        let response = self
            .http_client
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BrokerError::from_response("Profile request failed", response).await);
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuth {
    fn consent_url(&self, csrf_state: &str) -> Result<String, BrokerError> {
        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                // Offline access plus forced consent so every login yields a refresh token
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", csrf_state),
            ],
        )
        .map_err(|e| BrokerError::Internal(format!("Invalid authorization URL: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<Identity, BrokerError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let issued_at = Utc::now();
        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BrokerError::from_response("Token exchange failed", response).await);
        }

        let tokens: TokenResponse = response.json().await?;
        let profile = self.fetch_profile(&tokens.access_token).await?;

        let email = profile.email.unwrap_or_default();
        Ok(Identity {
            id: profile.sub,
            display_name: profile.name.unwrap_or_else(|| email.clone()),
            email,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token.filter(|t| !t.is_empty()),
            expires_at: tokens
                .expires_in
                .map(|secs| issued_at + chrono::Duration::seconds(secs)),
        })
    }
}
