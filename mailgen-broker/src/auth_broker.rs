//! Authorization-code handshake with the identity provider
//!
//! Per session: `Unauthenticated -> PendingConsent -> Authenticated`.
//! Provider denial or a failed exchange drops back to `Unauthenticated`;
//! logout destroys the session outright.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mailgen_core::Identity;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::BrokerError;
use crate::store::{AuthState, SessionId, SessionRecord, SessionRepository};

/// How long a session may wait on the consent screen before it is pruned
pub const PENDING_CONSENT_MINUTES: i64 = 10;

/// An OAuth2 authorization-code provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent screen URL; `csrf_state` must come back on the callback
    fn consent_url(&self, csrf_state: &str) -> Result<String, BrokerError>;

    /// Exchange an authorization code for tokens and the user's profile
    async fn exchange_code(&self, code: &str) -> Result<Identity, BrokerError>;
}

/// Query parameters the provider appends to the callback URL
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Drives sign-in for one request against the shared session repository
pub struct AuthBroker<'a, S, P> {
    sessions: &'a S,
    provider: &'a P,
}

impl<'a, S, P> AuthBroker<'a, S, P>
where
    S: SessionRepository,
    P: IdentityProvider,
{
    pub fn new(sessions: &'a S, provider: &'a P) -> Self {
        Self { sessions, provider }
    }

    /// Begin the handshake.
    ///
    /// Always issues a fresh session (any previous one is discarded) in
    /// `PendingConsent`, and returns its id with the consent URL. Handshakes
    /// abandoned for longer than [`PENDING_CONSENT_MINUTES`] are dropped.
    pub fn start_auth(
        &self,
        current: Option<&SessionId>,
    ) -> Result<(SessionId, String), BrokerError> {
        let csrf_state = Uuid::new_v4().simple().to_string();
        let url = self.provider.consent_url(&csrf_state)?;

        if let Some(old) = current {
            if let Err(err) = self.sessions.destroy(old) {
                tracing::warn!(session = %old, error = %err, "Failed to discard previous session");
            }
        }

        let cutoff = Utc::now() - Duration::minutes(PENDING_CONSENT_MINUTES);
        match self.sessions.prune_pending(cutoff) {
            Ok(0) => {}
            Ok(pruned) => tracing::debug!(pruned, "Pruned abandoned sign-ins"),
            Err(err) => tracing::warn!(error = %err, "Failed to prune abandoned sign-ins"),
        }

        let mut record = SessionRecord::new();
        record.auth = AuthState::PendingConsent { csrf_state };
        let id = record.id.clone();
        self.sessions.put(record)?;

        tracing::debug!(session = %id, "Authorization started");
        Ok((id, url))
    }

    /// Complete the handshake from the provider's callback
    pub async fn handle_callback(
        &self,
        session: Option<&SessionId>,
        params: CallbackParams,
    ) -> Result<(), BrokerError> {
        let id = session.ok_or_else(|| BrokerError::AuthFailed("No session".to_string()))?;
        let record = self
            .sessions
            .get(id)?
            .ok_or_else(|| BrokerError::AuthFailed("Unknown session".to_string()))?;

        let expected_state = match record.auth {
            AuthState::PendingConsent { csrf_state } => csrf_state,
            _ => {
                return Err(BrokerError::AuthFailed(
                    "No authorization in progress".to_string(),
                ))
            }
        };

        if let Some(error) = params.error {
            return Err(self.fail(id, format!("Provider denied consent: {}", error)));
        }
        if params.state.as_deref() != Some(expected_state.as_str()) {
            return Err(self.fail(id, "State mismatch"));
        }
        let code = match params.code.filter(|c| !c.is_empty()) {
            Some(code) => code,
            None => return Err(self.fail(id, "Missing authorization code")),
        };

        let identity = match self.provider.exchange_code(&code).await {
            Ok(identity) => identity,
            Err(err) => return Err(self.fail(id, err.to_string())),
        };

        let user = identity.id.clone();
        let has_refresh_token = identity.refresh_token.is_some();
        let mut identity = Some(identity);
        let stored = self.sessions.mutate(id, &mut |record| {
            if let Some(identity) = identity.take() {
                record.auth = AuthState::Authenticated(identity);
            }
        })?;
        if !stored {
            return Err(BrokerError::AuthFailed(
                "Session ended during sign-in".to_string(),
            ));
        }

        tracing::info!(session = %id, user = %user, has_refresh_token, "User authenticated");
        Ok(())
    }

    /// Whether the session holds an authenticated identity. Pure read.
    pub fn status(&self, session: Option<&SessionId>) -> bool {
        session
            .and_then(|id| self.sessions.get(id).ok().flatten())
            .is_some_and(|record| record.is_authenticated())
    }

    /// Forget the identity and destroy the session.
    ///
    /// Store errors are logged; the caller always acknowledges the logout.
    pub fn logout(&self, session: Option<&SessionId>) {
        let Some(id) = session else {
            return;
        };

        if let Err(err) = self
            .sessions
            .mutate(id, &mut |record| record.auth = AuthState::Unauthenticated)
        {
            tracing::error!(session = %id, error = %err, "Logout error");
        }
        if let Err(err) = self.sessions.destroy(id) {
            tracing::error!(session = %id, error = %err, "Logout error");
            return;
        }

        tracing::info!(session = %id, "Logged out");
    }

    /// Drop a pending handshake back to `Unauthenticated`
    fn fail(&self, id: &SessionId, reason: impl Into<String>) -> BrokerError {
        if let Err(err) = self
            .sessions
            .mutate(id, &mut |record| record.auth = AuthState::Unauthenticated)
        {
            tracing::warn!(session = %id, error = %err, "Failed to reset session");
        }
        BrokerError::AuthFailed(reason.into())
    }
}
