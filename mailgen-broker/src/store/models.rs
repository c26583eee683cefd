//! Data models for session storage

use chrono::{DateTime, Utc};
use mailgen_core::Identity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique session identifier, carried in the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a session is in the sign-in handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    /// Sent to the consent screen; `csrf_state` must come back on the callback
    PendingConsent { csrf_state: String },
    Authenticated(Identity),
}

/// A browser session
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    pub auth: AuthState,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// A fresh, unauthenticated session with a random id
    pub fn new() -> Self {
        Self {
            id: SessionId::generate(),
            auth: AuthState::Unauthenticated,
            created_at: Utc::now(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.auth {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn identity_mut(&mut self) -> Option<&mut Identity> {
        match &mut self.auth {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self::new()
    }
}
