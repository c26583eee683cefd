//! Delivery of composed messages through the provider's mail API

use async_trait::async_trait;
use mailgen_core::{Identity, RefreshedTokens};
use serde::{Deserialize, Serialize};

use crate::error::BrokerError;

/// Synchronous handler for token-rotation events raised during a send
pub type TokenListener<'a> = dyn Fn(&RefreshedTokens) + Send + Sync + 'a;

/// What the provider reports for a delivered message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_ids: Vec<String>,
}

/// A mail API that accepts base64url-encoded raw messages
#[async_trait]
pub trait MailApi: Send + Sync {
    /// Send `raw` as `identity`, issuing exactly one send request.
    ///
    /// Any token rotation that happens along the way is reported through
    /// `on_tokens` before this returns.
    async fn send_raw(
        &self,
        identity: &Identity,
        raw: &str,
        on_tokens: &TokenListener<'_>,
    ) -> Result<DeliveryReceipt, BrokerError>;
}

/// Send an encoded message on behalf of `identity`.
///
/// Fails with `NotAuthenticated`, without touching the network, when there
/// is no identity or it carries no access token.
pub async fn deliver<M>(
    mailer: &M,
    identity: Option<&Identity>,
    raw: &str,
    on_tokens: &TokenListener<'_>,
) -> Result<DeliveryReceipt, BrokerError>
where
    M: MailApi + ?Sized,
{
    let identity = identity
        .filter(|identity| identity.has_access_token())
        .ok_or(BrokerError::NotAuthenticated)?;

    mailer.send_raw(identity, raw, on_tokens).await
}
