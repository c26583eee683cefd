//! Gmail `users.messages.send` client

use async_trait::async_trait;
use chrono::Utc;
use mailgen_core::Identity;
use reqwest::Client;
use serde_json::json;

use super::GoogleOAuth;
use crate::delivery::{DeliveryReceipt, MailApi, TokenListener};
use crate::error::BrokerError;

/// Sends raw messages through the Gmail API with the user's delegated tokens
#[derive(Clone)]
pub struct GmailClient {
    client: Client,
    api_base: String,
    oauth: GoogleOAuth,
}

impl GmailClient {
    pub fn new(oauth: GoogleOAuth) -> Self {
        Self {
            client: Client::new(),
            api_base: oauth.config().gmail_api_base.trim_end_matches('/').to_string(),
            oauth,
        }
    }

    /// Access token to send with, refreshing it first if it has expired
    async fn access_token(
        &self,
        identity: &Identity,
        on_tokens: &TokenListener<'_>,
    ) -> Result<String, BrokerError> {
        let refresh_token = match identity.refresh_token.as_deref() {
            Some(token) if identity.is_expired_at(Utc::now()) => token,
            _ => return Ok(identity.access_token.clone()),
        };

        tracing::debug!(user = %identity.id, "Access token expired, refreshing");
        let refreshed = self.oauth.refresh(refresh_token).await?;
        on_tokens(&refreshed);

        Ok(refreshed
            .access_token()
            .unwrap_or(identity.access_token.as_str())
            .to_string())
    }
}

#[async_trait]
impl MailApi for GmailClient {
    async fn send_raw(
        &self,
        identity: &Identity,
        raw: &str,
        on_tokens: &TokenListener<'_>,
    ) -> Result<DeliveryReceipt, BrokerError> {
        let access_token = self.access_token(identity, on_tokens).await?;

        let response = self
            .client
            .post(format!("{}/gmail/v1/users/me/messages/send", self.api_base))
            .bearer_auth(access_token)
            .json(&json!({ "raw": raw }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BrokerError::from_response("Gmail API error", response).await);
        }

        let receipt: DeliveryReceipt = response.json().await?;
        tracing::debug!(user = %identity.id, message_id = %receipt.id, "Gmail accepted message");
        Ok(receipt)
    }
}
