//! Google OAuth2 and Gmail API clients

mod gmail;
mod oauth;

pub use gmail::GmailClient;
pub use oauth::GoogleOAuth;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GMAIL_API_BASE: &str = "https://gmail.googleapis.com";

/// Scopes requested on the consent screen
pub const SCOPES: [&str; 3] = [
    "profile",
    "email",
    "https://www.googleapis.com/auth/gmail.send",
];

/// OAuth client registration plus the Google endpoints it talks to
#[derive(Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI registered for the authorization-code flow
    pub callback_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub gmail_api_base: String,
}

impl GoogleConfig {
    /// Registration against the production Google endpoints
    pub fn new(client_id: String, client_secret: String, callback_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            callback_url,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            gmail_api_base: GMAIL_API_BASE.to_string(),
        }
    }

    /// Point the token, userinfo and Gmail endpoints at `base` (for testing)
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.token_url = format!("{}/token", base);
        self.userinfo_url = format!("{}/userinfo", base);
        self.gmail_api_base = base.to_string();
        self
    }
}
