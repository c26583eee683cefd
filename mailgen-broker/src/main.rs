//! mailgen broker
//!
//! Sign in with Google, generate an email with an LLM, send it via Gmail.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailgen_broker::{
    routes, AppState, Config, GmailClient, GoogleOAuth, HttpCompletionClient,
    InMemorySessionRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailgen_broker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(?config, "Loaded configuration");

    let oauth = GoogleOAuth::new(config.google.clone())?;
    let mailer = GmailClient::new(oauth.clone());
    let completion = HttpCompletionClient::new(config.completion.clone());

    // Create app state
    let state = Arc::new(AppState::new(
        &config.session_secret,
        InMemorySessionRepository::new(),
        oauth,
        completion,
        mailer,
    ));

    // Create router
    let app = routes::create_router_with_static_path(state, &config.static_dir);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
