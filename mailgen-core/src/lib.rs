//! mailgen core library
//!
//! Provider-independent pieces of the mailgen service:
//! - Identities holding delegated OAuth tokens, and the merge applied when
//!   the provider rotates them
//! - Outbound message composition and the base64url transport encoding
//! - Parsing of chat-completion responses and of generated email text

pub mod completion;
pub mod error;
pub mod generated;
pub mod identity;
pub mod message;

pub use completion::{ChatMessage, CompletionRequest, CompletionResponse};
pub use error::Error;
pub use generated::GeneratedEmail;
pub use identity::{Identity, RefreshedTokens};
pub use message::{decode_raw, encode_raw, OutboundMessage, DEFAULT_SUBJECT};

/// Result type for mailgen-core operations
pub type Result<T> = std::result::Result<T, Error>;
