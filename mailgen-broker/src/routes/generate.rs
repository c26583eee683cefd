//! AI email generation endpoint

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth_broker::IdentityProvider;
use crate::delivery::MailApi;
use crate::error::BrokerError;
use crate::generation::{self, CompletionApi};
use crate::state::AppState;
use crate::store::SessionRepository;

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    /// Generated text, unsplit
    pub email: String,
}

/// POST /generate-email
pub async fn generate_email<S, P, C, M>(
    State(state): State<Arc<AppState<S, P, C, M>>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, BrokerError>
where
    S: SessionRepository,
    P: IdentityProvider,
    C: CompletionApi,
    M: MailApi,
{
    let Json(req) = payload.map_err(|e| BrokerError::InvalidRequest(e.body_text()))?;
    let prompt = req.prompt.unwrap_or_default();

    let email = generation::generate(&state.completion, &prompt).await?;
    tracing::debug!(chars = email.len(), "Email generated");

    Ok(Json(GenerateResponse { email }))
}
