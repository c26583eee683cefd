//! Session cookie helpers

use tower_cookies::{Cookie, Cookies, Key};

use crate::store::SessionId;

pub const SESSION_COOKIE: &str = "mailgen_session";

/// Session id from the signed cookie, if present and untampered
pub fn get_session_id(cookies: &Cookies, key: &Key) -> Option<SessionId> {
    cookies
        .signed(key)
        .get(SESSION_COOKIE)
        .map(|c| SessionId(c.value().to_string()))
}

/// Helper to set session cookie
pub fn set_session_cookie(cookies: &Cookies, key: &Key, session_id: &SessionId) {
    let cookie = Cookie::build((SESSION_COOKIE, session_id.0.clone()))
        .path("/")
        .http_only(true)
        .build();
    cookies.signed(key).add(cookie);
}

/// Helper to clear session cookie
pub fn clear_session_cookie(cookies: &Cookies) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(tower_cookies::cookie::time::Duration::ZERO)
        .build();
    cookies.add(cookie);
}
