//! Authenticated identities and token rotation

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in user's profile plus the OAuth tokens delegated to us
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider subject identifier
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub access_token: String,
    /// Issued once per consent; see [`Identity::apply_refresh`]
    pub refresh_token: Option<String>,
    /// When the access token stops being valid, if the provider said so
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Whether this identity can authorize a provider call at all
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Whether the access token is known to have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Merge a token-rotation event into this identity.
    ///
    /// A present access token replaces the current one (and its expiry).
    /// The refresh token is only replaced by a non-empty value; providers
    /// usually issue it once, so later events that omit it keep the old one.
    /// Applying the same event twice leaves the identity unchanged.
    pub fn apply_refresh(&mut self, refreshed: &RefreshedTokens) {
        self.apply_refresh_at(refreshed, Utc::now());
    }

    /// [`Identity::apply_refresh`] with an explicit issue time
    pub fn apply_refresh_at(&mut self, refreshed: &RefreshedTokens, issued_at: DateTime<Utc>) {
        if let Some(access_token) = refreshed.access_token() {
            self.access_token = access_token.to_string();
            self.expires_at = refreshed.expires_at(issued_at);
        }
        if let Some(refresh_token) = refreshed.refresh_token() {
            self.refresh_token = Some(refresh_token.to_string());
        }
    }
}

/// Tokens reported by the provider when it rotates credentials
///
/// Deserializes directly from an OAuth2 token endpoint response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshedTokens {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl RefreshedTokens {
    /// Non-empty access token, if any
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Non-empty refresh token, if any
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| issued_at + Duration::seconds(secs))
    }
}
