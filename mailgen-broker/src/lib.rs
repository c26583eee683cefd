//! mailgen broker
//!
//! Web service that signs users in with Google, drafts email text with a
//! chat-completion API and sends it from the user's own Gmail account
//! using the delegated OAuth tokens.

pub mod auth_broker;
pub mod config;
pub mod delivery;
pub mod error;
pub mod generation;
pub mod google;
pub mod routes;
pub mod state;
pub mod store;

pub use auth_broker::{AuthBroker, CallbackParams, IdentityProvider, PENDING_CONSENT_MINUTES};
pub use config::{CompletionConfig, Config, ConfigError};
pub use delivery::{deliver, DeliveryReceipt, MailApi, TokenListener};
pub use error::BrokerError;
pub use generation::{generate, CompletionApi, HttpCompletionClient};
pub use google::{GmailClient, GoogleConfig, GoogleOAuth};
pub use state::AppState;
pub use store::{InMemorySessionRepository, SessionId, SessionRepository};
