//! Shared application state

use sha2::{Digest, Sha512};
use tower_cookies::Key;

use crate::auth_broker::{AuthBroker, IdentityProvider};
use crate::store::SessionRepository;

/// Everything the handlers share: the session repository, the three
/// provider clients and the cookie signing key
pub struct AppState<S, P, C, M> {
    pub sessions: S,
    pub identity_provider: P,
    pub completion: C,
    pub mailer: M,
    /// Signs the session cookie
    pub cookie_key: Key,
}

impl<S, P, C, M> AppState<S, P, C, M> {
    pub fn new(session_secret: &str, sessions: S, identity_provider: P, completion: C, mailer: M) -> Self {
        Self {
            sessions,
            identity_provider,
            completion,
            mailer,
            cookie_key: cookie_key(session_secret),
        }
    }
}

impl<S, P, C, M> AppState<S, P, C, M>
where
    S: SessionRepository,
    P: IdentityProvider,
{
    pub fn auth_broker(&self) -> AuthBroker<'_, S, P> {
        AuthBroker::new(&self.sessions, &self.identity_provider)
    }
}

/// Derive the 64-byte cookie key from a secret of any length
pub fn cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}
