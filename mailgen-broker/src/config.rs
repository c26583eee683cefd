//! Broker configuration

use std::fmt;

use thiserror::Error;

use crate::google::GoogleConfig;

pub const DEFAULT_COMPLETION_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_COMPLETION_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    /// Port to listen on
    pub port: u16,

    /// Google OAuth client and endpoints
    pub google: GoogleConfig,

    /// Secret the session cookie is signed with
    pub session_secret: String,

    /// Chat-completion endpoint and credentials
    pub completion: CompletionConfig,

    /// Directory served for everything the API routes don't handle
    pub static_dir: String,
}

#[derive(Clone)]
pub struct CompletionConfig {
    pub url: String,
    pub model: String,
    pub api_key: String,
}

/// Non-empty environment variable
fn get_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn require_env(key: &'static str) -> Result<String, ConfigError> {
    get_env(key).ok_or(ConfigError::Missing(key))
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required:
    /// - GOOGLE_CLIENT_ID
    /// - GOOGLE_CLIENT_SECRET
    /// - GOOGLE_CALLBACK_URL
    /// - SESSION_SECRET
    /// - GROQ_API_KEY
    ///
    /// Optional:
    /// - PORT (default: 3000)
    /// - COMPLETION_API_URL (default: Groq's OpenAI-compatible endpoint)
    /// - COMPLETION_MODEL (default: llama-3.3-70b-versatile)
    /// - STATIC_DIR (default: public)
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match get_env("PORT") {
            Some(port) => port.parse().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("{}", e),
            })?,
            None => 3000,
        };

        let google = GoogleConfig::new(
            require_env("GOOGLE_CLIENT_ID")?,
            require_env("GOOGLE_CLIENT_SECRET")?,
            require_env("GOOGLE_CALLBACK_URL")?,
        );

        let completion = CompletionConfig {
            url: get_env("COMPLETION_API_URL").unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string()),
            model: get_env("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            api_key: require_env("GROQ_API_KEY")?,
        };

        Ok(Self {
            port,
            google,
            session_secret: require_env("SESSION_SECRET")?,
            completion,
            static_dir: get_env("STATIC_DIR").unwrap_or_else(|| "public".to_string()),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("google_client_id", &self.google.client_id)
            .field("google_callback_url", &self.google.callback_url)
            .field("completion_url", &self.completion.url)
            .field("completion_model", &self.completion.model)
            .field("static_dir", &self.static_dir)
            .finish_non_exhaustive()
    }
}
