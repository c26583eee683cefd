//! Error types for mailgen-core

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The completion payload matched none of the supported schemas.
    /// Carries the payload as received.
    #[error("Unrecognized completion response shape: {0}")]
    UnrecognizedResponseShape(Value),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
