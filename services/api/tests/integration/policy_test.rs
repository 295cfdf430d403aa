use axum::http::StatusCode;
use serde_json::{Value, json};

use medworld_api::middleware::{
    ADMIN, ADMIN_DOCTOR, ANY_USER, DOCTOR_ADMIN, DOCTOR_PATIENT_ADMIN, PATIENT_ADMIN,
    PATIENT_DOCTOR_ADMIN, SUPERADMIN_ADMIN,
};
use medworld_auth::principal::Principal;
use medworld_domain::role::Role;

use crate::helpers::{gated_probe, principal};

const ALL_ROLES: [Role; 5] = [
    Role::Superadmin,
    Role::Admin,
    Role::Doctor,
    Role::Assistant,
    Role::Patient,
];

// ── Allow lists ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_admit_exactly_the_listed_roles() {
    let gates: [(&str, &'static [Role]); 7] = [
        ("admin", ADMIN),
        ("admin_doctor", ADMIN_DOCTOR),
        ("doctor_admin", DOCTOR_ADMIN),
        ("patient_admin", PATIENT_ADMIN),
        ("superadmin_admin", SUPERADMIN_ADMIN),
        ("doctor_patient_admin", DOCTOR_PATIENT_ADMIN),
        ("patient_doctor_admin", PATIENT_DOCTOR_ADMIN),
    ];
    for (name, required) in gates {
        for role in ALL_ROLES {
            let server = gated_probe(required, Some(principal(role)));
            let status = server.get("/probe").await.status_code();
            let expected = if required.contains(&role) {
                StatusCode::OK
            } else {
                StatusCode::FORBIDDEN
            };
            assert_eq!(status, expected, "gate {name}, role {role}");
        }
    }
}

#[tokio::test]
async fn should_admit_any_authenticated_role_through_an_open_gate() {
    for role in ALL_ROLES {
        let server = gated_probe(ANY_USER, Some(principal(role)));
        server.get("/probe").await.assert_status(StatusCode::OK);
    }
}

#[tokio::test]
async fn should_reject_anonymous_callers_even_on_an_open_gate() {
    let server = gated_probe(ANY_USER, None);
    let response = server.get("/probe").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body, json!({ "message": "Unauthenticated." }));
}

// ── Refusal bodies ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_name_the_required_roles_in_the_403_body() {
    let server = gated_probe(DOCTOR_ADMIN, Some(principal(Role::Patient)));
    let response = server.get("/probe").await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "message": "Unauthorized. Required role: doctor, admin",
            "user_role": "patient",
        })
    );
}

// ── Policy shape ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_not_give_superadmin_an_implicit_pass() {
    let server = gated_probe(ADMIN, Some(principal(Role::Superadmin)));
    server.get("/probe").await.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_gate_on_role_alone_not_ownership() {
    // Two doctors with unrelated ids clear the same gate; the policy reads
    // the role, never the user id.
    for user_id in [1, 99] {
        let server = gated_probe(
            DOCTOR_ADMIN,
            Some(Principal {
                user_id,
                role: Role::Doctor,
            }),
        );
        server.get("/probe").await.assert_status(StatusCode::OK);
    }
}
