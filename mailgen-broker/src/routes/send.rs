//! Email delivery endpoint

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use mailgen_core::{OutboundMessage, RefreshedTokens};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;

use super::session::get_session_id;
use crate::auth_broker::IdentityProvider;
use crate::delivery::{self, DeliveryReceipt, MailApi};
use crate::error::BrokerError;
use crate::generation::CompletionApi;
use crate::state::AppState;
use crate::store::SessionRepository;

/// A single (possibly comma-separated) string or a list
#[derive(Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn into_list(self) -> Vec<String> {
        match self {
            Recipients::One(list) => list.split([',', '\n']).map(str::to_string).collect(),
            Recipients::Many(list) => list,
        }
    }
}

#[derive(Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub recipients: Option<Recipients>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Serialize)]
pub struct SendResponse {
    pub ok: bool,
    pub result: DeliveryReceipt,
}

/// POST /send-email
pub async fn send_email<S, P, C, M>(
    State(state): State<Arc<AppState<S, P, C, M>>>,
    cookies: Cookies,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, BrokerError>
where
    S: SessionRepository,
    P: IdentityProvider,
    C: CompletionApi,
    M: MailApi,
{
    let session_id = get_session_id(&cookies, &state.cookie_key).ok_or(BrokerError::NotAuthenticated)?;
    let identity = state
        .sessions
        .get(&session_id)?
        .and_then(|record| record.identity().cloned())
        .ok_or(BrokerError::NotAuthenticated)?;

    let Json(req) = payload.map_err(|e| BrokerError::InvalidRequest(e.body_text()))?;
    let recipients = req.recipients.map(Recipients::into_list).unwrap_or_default();
    let message = OutboundMessage::new(recipients, req.subject, req.body.unwrap_or_default())?;
    let raw = message.to_raw(&identity);

    let sessions = &state.sessions;
    let on_tokens = |tokens: &RefreshedTokens| {
        let stored = sessions.mutate(&session_id, &mut |record| {
            if let Some(identity) = record.identity_mut() {
                identity.apply_refresh(tokens);
            }
        });
        match stored {
            Ok(true) => tracing::debug!(session = %session_id, "Stored rotated tokens"),
            Ok(false) => tracing::warn!(session = %session_id, "Session gone before tokens were stored"),
            Err(err) => tracing::error!(session = %session_id, error = %err, "Failed to store rotated tokens"),
        }
    };

    let result = delivery::deliver(&state.mailer, Some(&identity), &raw, &on_tokens).await?;
    tracing::info!(
        session = %session_id,
        message_id = %result.id,
        recipients = message.recipients().len(),
        "Email sent"
    );

    Ok(Json(SendResponse { ok: true, result }))
}
