//! Sign-in, sign-out and status endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tower_cookies::Cookies;

use super::found;
use super::session::{clear_session_cookie, get_session_id, set_session_cookie};
use crate::auth_broker::{CallbackParams, IdentityProvider};
use crate::delivery::MailApi;
use crate::error::BrokerError;
use crate::generation::CompletionApi;
use crate::state::AppState;
use crate::store::SessionRepository;

const HOME_PAGE: &str = "/index.html";
const LOGIN_PAGE: &str = "/login.html";

/// GET /auth/google
pub async fn start_auth<S, P, C, M>(
    State(state): State<Arc<AppState<S, P, C, M>>>,
    cookies: Cookies,
) -> Result<Response, BrokerError>
where
    S: SessionRepository,
    P: IdentityProvider,
    C: CompletionApi,
    M: MailApi,
{
    let current = get_session_id(&cookies, &state.cookie_key);
    let (session_id, consent_url) = state.auth_broker().start_auth(current.as_ref())?;
    set_session_cookie(&cookies, &state.cookie_key, &session_id);

    Ok(found(&consent_url))
}

/// GET /auth/google/callback
pub async fn callback<S, P, C, M>(
    State(state): State<Arc<AppState<S, P, C, M>>>,
    cookies: Cookies,
    Query(params): Query<CallbackParams>,
) -> Response
where
    S: SessionRepository,
    P: IdentityProvider,
    C: CompletionApi,
    M: MailApi,
{
    let session_id = get_session_id(&cookies, &state.cookie_key);

    match state
        .auth_broker()
        .handle_callback(session_id.as_ref(), params)
        .await
    {
        Ok(()) => found(HOME_PAGE),
        Err(err) => {
            tracing::warn!(error = %err, "Sign-in failed");
            found(LOGIN_PAGE)
        }
    }
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub authenticated: bool,
}

/// GET /auth/status
pub async fn status<S, P, C, M>(
    State(state): State<Arc<AppState<S, P, C, M>>>,
    cookies: Cookies,
) -> Json<StatusResponse>
where
    S: SessionRepository,
    P: IdentityProvider,
    C: CompletionApi,
    M: MailApi,
{
    let session_id = get_session_id(&cookies, &state.cookie_key);
    Json(StatusResponse {
        authenticated: state.auth_broker().status(session_id.as_ref()),
    })
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

/// POST /logout
pub async fn logout<S, P, C, M>(
    State(state): State<Arc<AppState<S, P, C, M>>>,
    cookies: Cookies,
) -> Json<LogoutResponse>
where
    S: SessionRepository,
    P: IdentityProvider,
    C: CompletionApi,
    M: MailApi,
{
    let session_id = get_session_id(&cookies, &state.cookie_key);
    state.auth_broker().logout(session_id.as_ref());
    clear_session_cookie(&cookies);

    Json(LogoutResponse { ok: true })
}
