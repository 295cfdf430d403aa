//! Session cookie builder.
//!
//! Attribute set is a wire contract with the browser frontend: host-only
//! (no Domain), not Secure, HttpOnly, SameSite=Lax, 7-day Max-Age.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the session token.
pub const AUTH_TOKEN: &str = "auth_token";

/// Cookie Max-Age in seconds (7 days).
pub const AUTH_COOKIE_EXP: u64 = 604800;

/// Set the session-token cookie on the jar.
///
/// The value is the full plaintext token (`"{id}|{secret}"`), the same
/// string returned in the login/register response body.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use medworld_auth::cookie::{set_auth_cookie, AUTH_TOKEN};
///
/// let jar = set_auth_cookie(CookieJar::new(), "7|abc123".to_string());
/// let cookie = jar.get(AUTH_TOKEN).unwrap();
/// assert_eq!(cookie.value(), "7|abc123");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), None);
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(!cookie.secure().unwrap_or(false));
/// ```
pub fn set_auth_cookie(jar: CookieJar, value: String) -> CookieJar {
    let cookie = Cookie::build((AUTH_TOKEN, value))
        .path("/")
        .max_age(Duration::seconds(AUTH_COOKIE_EXP as i64))
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
