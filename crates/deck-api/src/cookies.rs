//! Credential cookies
//!
//! The bearer token travels in `token`, the server session token in
//! `sessionToken`. Both are `HttpOnly; Path=/; SameSite=Lax`, with `Secure`
//! added in production.

use axum::http::{header::SET_COOKIE, HeaderName};
use axum::response::AppendHeaders;
use axum_extra::extract::cookie::CookieJar;
use deck_service::dto::IssuedCredentials;

/// Bearer token cookie
pub const TOKEN_COOKIE: &str = "token";
/// Server session cookie
pub const SESSION_COOKIE: &str = "sessionToken";

pub type SetCookies = AppendHeaders<Vec<(HeaderName, String)>>;

/// Format one `Set-Cookie` value
pub fn cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    format!(
        "{name}={value}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}{}",
        if secure { "; Secure" } else { "" }
    )
}

/// Cookies for freshly issued credentials. Trial credentials have no session
/// and leave any existing `sessionToken` cookie untouched.
pub fn issue(credentials: &IssuedCredentials, secure: bool) -> SetCookies {
    let mut cookies = vec![(
        SET_COOKIE,
        cookie(
            TOKEN_COOKIE,
            &credentials.token.token,
            credentials.token.expires_in,
            secure,
        ),
    )];

    if let Some(session) = &credentials.session {
        cookies.push((
            SET_COOKIE,
            cookie(SESSION_COOKIE, &session.token, session.max_age, secure),
        ));
    }

    AppendHeaders(cookies)
}

/// Expire both credential cookies
pub fn clear(secure: bool) -> SetCookies {
    AppendHeaders(vec![
        (SET_COOKIE, cookie(TOKEN_COOKIE, "", 0, secure)),
        (SET_COOKIE, cookie(SESSION_COOKIE, "", 0, secure)),
    ])
}

/// Non-empty value of a request cookie
pub fn read(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
