//! Authenticated principal and request-credential extraction.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use http::request::Parts;
use http::{HeaderMap, StatusCode, header};
use medworld_domain::role::Role;

use crate::cookie::AUTH_TOKEN;

/// The authenticated user attached to a request by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub role: Role,
}

/// Pick the request credential: `Authorization: Bearer` wins, the
/// `auth_token` cookie is the fallback when no bearer header is present.
///
/// A present-but-invalid bearer token is still the chosen credential; the
/// cookie is never consulted once a bearer value exists, so a stale header
/// cannot be rescued by a valid cookie.
pub fn bearer_or_cookie(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    jar.get(AUTH_TOKEN).map(|c| c.value().to_owned())
}

/// Rejection when a handler asks for a [`Principal`] on a request the auth
/// middleware never authenticated. Mirrors the middleware's 401 body so the
/// wire contract holds even if a route is wired without the middleware.
#[derive(Debug)]
pub struct Unauthenticated;

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({ "message": "Unauthenticated." })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Unauthenticated;

    // Desugared form; the returned future must be `Send` and borrow nothing.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let principal = parts.extensions.get::<Principal>().copied();
        async move { principal.ok_or(Unauthenticated) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;
    use http::Request;

    fn jar_with_token(value: &str) -> CookieJar {
        CookieJar::new().add(Cookie::new(AUTH_TOKEN, value.to_owned()))
    }

    #[test]
    fn should_prefer_bearer_header_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer 1|from-header".parse().unwrap());
        let jar = jar_with_token("2|from-cookie");

        assert_eq!(
            bearer_or_cookie(&headers, &jar),
            Some("1|from-header".to_owned())
        );
    }

    #[test]
    fn should_fall_back_to_cookie_when_no_bearer_header() {
        let headers = HeaderMap::new();
        let jar = jar_with_token("2|from-cookie");

        assert_eq!(
            bearer_or_cookie(&headers, &jar),
            Some("2|from-cookie".to_owned())
        );
    }

    #[test]
    fn should_fall_back_to_cookie_when_authorization_is_not_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwdw==".parse().unwrap());
        let jar = jar_with_token("2|from-cookie");

        assert_eq!(
            bearer_or_cookie(&headers, &jar),
            Some("2|from-cookie".to_owned())
        );
    }

    #[test]
    fn should_return_none_without_header_or_cookie() {
        assert_eq!(bearer_or_cookie(&HeaderMap::new(), &CookieJar::new()), None);
    }

    #[tokio::test]
    async fn should_extract_principal_from_request_extensions() {
        let principal = Principal {
            user_id: 9,
            role: Role::Doctor,
        };
        let mut request = Request::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(principal);
        let (mut parts, _body) = request.into_parts();

        let extracted = Principal::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, principal);
    }

    #[tokio::test]
    async fn should_reject_when_no_principal_was_attached() {
        let request = Request::builder().uri("/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let result = Principal::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err(), "expected Unauthenticated, got {result:?}");
    }
}
