//! Credential header builders for integration tests.
//!
//! The API accepts a session token either as `Authorization: Bearer` or as
//! the `auth_token` cookie. `TestSession` builds both header shapes so tests
//! can exercise each path (and the bearer-wins precedence) without a browser.

use http::{HeaderMap, HeaderName, HeaderValue};
use medworld_auth::cookie::AUTH_TOKEN;

/// A plaintext session token to attach to test requests.
pub struct TestSession {
    pub token: String,
}

impl TestSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Headers carrying the token as `Authorization: Bearer`.
    pub fn bearer_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
        );
        map
    }

    /// Headers carrying the token as the session cookie.
    pub fn cookie_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static("cookie"),
            HeaderValue::from_str(&format!("{AUTH_TOKEN}={}", self.token)).unwrap(),
        );
        map
    }
}
