//! Session-cookie builder for the dashboard.
//!
//! Same-site, HTTP-only, path `/` — matches what the React frontend and the
//! legacy deployment expect.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the session token.
pub const MOREA_SESSION_TOKEN: &str = "morea_access_token";

/// Session-token JWT lifetime in seconds (8 hours).
pub const SESSION_TOKEN_EXP: u64 = 28800;

/// Set the session-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use morea_auth::cookie::{set_session_cookie, MOREA_SESSION_TOKEN};
///
/// let jar = set_session_cookie(CookieJar::new(), "token_value".to_string());
/// let cookie = jar.get(MOREA_SESSION_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(28800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, value: String) -> CookieJar {
    let cookie = Cookie::build((MOREA_SESSION_TOKEN, value))
        .path("/")
        .max_age(Duration::seconds(SESSION_TOKEN_EXP as i64))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Clear the session cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use morea_auth::cookie::{clear_session_cookie, set_session_cookie, MOREA_SESSION_TOKEN};
///
/// let jar = set_session_cookie(CookieJar::new(), "a".to_string());
/// let jar = clear_session_cookie(jar);
/// let cookie = jar.get(MOREA_SESSION_TOKEN).unwrap();
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    let cookie = Cookie::build((MOREA_SESSION_TOKEN, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
