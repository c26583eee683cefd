//! HTTP routes for the broker

mod auth;
mod generate;
mod send;
mod session;

use std::sync::Arc;

use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth_broker::IdentityProvider;
use crate::delivery::MailApi;
use crate::generation::CompletionApi;
use crate::state::AppState;
use crate::store::SessionRepository;

pub use session::SESSION_COOKIE;

/// Create the router with all routes
pub fn create_router<S, P, C, M>(state: Arc<AppState<S, P, C, M>>) -> Router
where
    S: SessionRepository + 'static,
    P: IdentityProvider + 'static,
    C: CompletionApi + 'static,
    M: MailApi + 'static,
{
    create_router_with_static_path(state, "public")
}

/// Create the router with a custom static file path
pub fn create_router_with_static_path<S, P, C, M>(
    state: Arc<AppState<S, P, C, M>>,
    static_path: &str,
) -> Router
where
    S: SessionRepository + 'static,
    P: IdentityProvider + 'static,
    C: CompletionApi + 'static,
    M: MailApi + 'static,
{
    Router::new()
        .route("/", get(home))
        .route("/auth/google", get(auth::start_auth))
        .route("/auth/google/callback", get(auth::callback))
        .route("/auth/status", get(auth::status))
        .route("/logout", post(auth::logout))
        .route("/generate-email", post(generate::generate_email))
        .route("/send-email", post(send::send_email))
        // Login and compose pages
        .fallback_service(ServeDir::new(static_path))
        .layer(CookieManagerLayer::new())
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Mirror the caller's origin and allow the session cookie through
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// 302 Found to `location`
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// GET /
async fn home() -> Response {
    found("/login.html")
}
