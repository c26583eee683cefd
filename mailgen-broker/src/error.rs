//! Broker error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Not authenticated with Google")]
    NotAuthenticated,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// A completion or mail API call failed; `details` is the provider's payload
    #[error("{message}")]
    Upstream { message: String, details: Value },

    #[error("Unrecognized completion response shape")]
    UnrecognizedResponseShape(Value),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BrokerError {
    pub fn upstream(message: impl Into<String>, details: Value) -> Self {
        BrokerError::Upstream {
            message: message.into(),
            details,
        }
    }

    /// Upstream error for a non-success provider response.
    ///
    /// The message is the provider's own (`error.message`, or `error` when it
    /// is a string); the full payload is kept as details.
    pub async fn from_response(context: &str, response: reqwest::Response) -> Self {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let details = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        let message = details
            .get("error")
            .and_then(|error| error.get("message").or(Some(error)))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} ({})", context, status));

        BrokerError::upstream(message, details)
    }
}

impl From<mailgen_core::Error> for BrokerError {
    fn from(err: mailgen_core::Error) -> Self {
        match err {
            mailgen_core::Error::InvalidRequest(msg) => BrokerError::InvalidRequest(msg),
            mailgen_core::Error::UnrecognizedResponseShape(payload) => {
                BrokerError::UnrecognizedResponseShape(payload)
            }
            other => BrokerError::Internal(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for BrokerError {
    fn from(err: reqwest::Error) -> Self {
        BrokerError::upstream(err.to_string(), Value::Null)
    }
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            BrokerError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            BrokerError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, self.to_string(), None)
            }
            BrokerError::AuthFailed(msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                (StatusCode::UNAUTHORIZED, "Authentication failed".to_string(), None)
            }
            BrokerError::Upstream { message, details } => {
                tracing::error!(details = %details, "Upstream error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    message.clone(),
                    Some(details.clone()),
                )
            }
            BrokerError::UnrecognizedResponseShape(payload) => {
                tracing::error!(payload = %payload, "Unrecognized completion response shape");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    self.to_string(),
                    Some(payload.clone()),
                )
            }
            BrokerError::Session(msg) => {
                tracing::error!("Session error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error".to_string(), None)
            }
            BrokerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = match details {
            Some(details) if !details.is_null() => {
                json!({ "ok": false, "error": message, "details": details })
            }
            _ => json!({ "ok": false, "error": message }),
        };
        (status, axum::Json(body)).into_response()
    }
}
