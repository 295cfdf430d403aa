use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::routing::get;
use axum::{Extension, Router};
use axum_test::{TestRequest, TestServer};
use sea_orm::DatabaseConnection;

use medworld_api::middleware::require_role;
use medworld_api::router::build_router;
use medworld_api::state::AppState;
use medworld_auth::principal::Principal;
use medworld_domain::role::Role;

// ── Servers ──────────────────────────────────────────────────────────────────

/// Boots the full router on a disconnected database handle. Covers every
/// scenario the router settles before a query runs: health probes, the 404
/// fallback, credential gates and request-shape validation.
pub fn test_server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::default(),
    };
    TestServer::new(build_router(state)).unwrap()
}

/// A single probe route behind the given role gate, with an optional
/// already-resolved principal attached to every request.
pub fn gated_probe(required: &'static [Role], principal: Option<Principal>) -> TestServer {
    let mut router = Router::new()
        .route("/probe", get(|| async { "ok" }))
        .route_layer(middleware::from_fn(move |request: Request, next: Next| {
            require_role(required, request, next)
        }));
    if let Some(principal) = principal {
        router = router.layer(Extension(principal));
    }
    TestServer::new(router).unwrap()
}

// ── Request builders ─────────────────────────────────────────────────────────

/// Copies every header pair onto the request.
pub fn with_headers(mut request: TestRequest, headers: HeaderMap) -> TestRequest {
    for (name, value) in headers.iter() {
        request = request.add_header(name.clone(), value.clone());
    }
    request
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn principal(role: Role) -> Principal {
    Principal { user_id: 1, role }
}
