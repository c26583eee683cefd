//! Proxy to the external chat-completion API

mod http;

pub use http::HttpCompletionClient;

use async_trait::async_trait;
use mailgen_core::completion::extract_text;
use mailgen_core::CompletionRequest;
use serde_json::Value;

use crate::error::BrokerError;

/// A chat-completion endpoint
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Model identifier sent with every request
    fn model(&self) -> &str;

    /// Issue one completion call and return the raw JSON payload
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, BrokerError>;
}

/// Generate email text for `prompt`.
///
/// Exactly one upstream call is made; the text is pulled out of the payload
/// by the known response schemas and anything else is rejected.
pub async fn generate<C>(api: &C, prompt: &str) -> Result<String, BrokerError>
where
    C: CompletionApi + ?Sized,
{
    if prompt.trim().is_empty() {
        return Err(BrokerError::InvalidRequest("Missing prompt".to_string()));
    }

    let request = CompletionRequest::for_prompt(api.model(), prompt);
    let payload = api.complete(&request).await?;
    Ok(extract_text(&payload)?)
}
