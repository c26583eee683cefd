//! HTTP client for OpenAI-compatible chat-completion endpoints

use async_trait::async_trait;
use mailgen_core::CompletionRequest;
use reqwest::Client;
use serde_json::Value;

use super::CompletionApi;
use crate::config::CompletionConfig;
use crate::error::BrokerError;

/// Chat-completion client (Groq by default)
#[derive(Clone)]
pub struct HttpCompletionClient {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl HttpCompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.url,
            model: config.model,
            api_key: config.api_key,
        }
    }
}

#[async_trait]
impl CompletionApi for HttpCompletionClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Value, BrokerError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrokerError::from_response("Completion API error", response).await);
        }

        let text = response.text().await?;
        tracing::debug!(status = %status, bytes = text.len(), "Completion received");

        serde_json::from_str(&text).map_err(|_| BrokerError::UnrecognizedResponseShape(Value::String(text)))
    }
}
