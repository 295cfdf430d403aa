use axum::http::StatusCode;
use serde_json::{Value, json};

use medworld_testing::auth::TestSession;
use medworld_testing::fixture::Fixture;

use crate::helpers::{test_server, with_headers};

// ── Health probes ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_health_probes_without_credentials() {
    let server = test_server();
    server.get("/healthz").await.assert_status(StatusCode::OK);
    server.get("/readyz").await.assert_status(StatusCode::OK);
}

// ── Fallbacks ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_fall_back_to_404_for_unknown_paths() {
    let server = test_server();
    let response = server.get("/api/v1/no-such-resource").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_answer_405_for_a_known_path_with_the_wrong_method() {
    let server = test_server();
    let response = server.get("/api/v1/auth/login").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

// ── Credential gates ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_every_gated_group_without_credentials() {
    let server = test_server();
    // One representative route per gated group.
    for path in [
        "/api/v1/auth/me",
        "/api/v1/users",
        "/api/v1/assistants",
        "/api/v1/patients",
        "/api/v1/patients/1/appointments",
        "/api/v1/cabinets",
        "/api/v1/consultations",
    ] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body, json!({ "message": "Unauthenticated." }), "{path}");
    }

    // Write routes gate before the body is even read.
    let response = server.post("/api/v1/ratings").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_treat_a_malformed_bearer_token_as_anonymous() {
    let server = test_server();
    let session = TestSession::new("not-a-valid-token");
    let response = with_headers(server.get("/api/v1/auth/me"), session.bearer_headers()).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "message": "Unauthenticated." }));
}

#[tokio::test]
async fn should_treat_a_malformed_cookie_token_as_anonymous() {
    let server = test_server();
    let session = TestSession::new("not-a-valid-token");
    let response = with_headers(server.get("/api/v1/auth/me"), session.cookie_headers()).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "message": "Unauthenticated." }));
}

#[tokio::test]
async fn should_prefer_the_bearer_header_over_the_cookie() {
    let server = test_server();
    // The header wins; the well-formed cookie token would need a lookup and
    // is never read.
    let bearer = TestSession::new("not-a-valid-token");
    let cookie = TestSession::new("9999|0123456789012345678901234567890123456789");
    let mut headers = bearer.bearer_headers();
    headers.extend(cookie.cookie_headers());
    let response = with_headers(server.get("/api/v1/auth/me"), headers).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "message": "Unauthenticated." }));
}

// ── Request-shape validation at the edge ─────────────────────────────────────

#[tokio::test]
async fn should_report_every_missing_login_field_at_once() {
    let server = test_server();
    let response = server.post("/api/v1/auth/login").json(&json!({})).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "message": "Validation failed",
            "errors": {
                "email": ["The email field is required."],
                "password": ["The password field is required."],
            },
        })
    );
}

#[tokio::test]
async fn should_reject_registration_with_a_bad_email_and_role() {
    let server = test_server();
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "first_name": "Amine",
            "last_name": "Bouaziz",
            "email": "not-an-email",
            "password": "password123",
            "password_confirmation": "password123",
            "type": "alien",
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "message": "Validation failed",
            "errors": {
                "email": ["The email field must be a valid email address."],
                "type": ["The selected type is invalid."],
            },
        })
    );
}

// ── Golden-file drift ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_exactly_what_the_published_contracts_promise() {
    // Contracts whose scenarios settle before any query runs.
    for id in ["login_validation", "me_requires_token"] {
        let contract = Fixture::load(&format!("contracts/http/api/{id}.json"));
        let request = &contract["request"];
        let expect = &contract["expect"];

        let server = test_server();
        let path = request["path"].as_str().unwrap();
        let mut call = match request["method"].as_str() {
            Some("POST") => server.post(path),
            _ => server.get(path),
        };
        if !request["body"].is_null() {
            call = call.json(&request["body"]);
        }

        let response = call.await;
        assert_eq!(
            u64::from(response.status_code().as_u16()),
            expect["status"].as_u64().unwrap(),
            "{id}"
        );
        assert_eq!(response.json::<Value>(), expect["body"], "{id}");
    }
}
