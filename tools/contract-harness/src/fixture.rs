//! Contract fixture format and loader.
//!
//! Each fixture file at `contracts/http/{service}/{id}.json` describes one
//! HTTP assertion: the request to send (optionally on behalf of a seeded
//! identity) and the response it must produce.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// A single HTTP contract assertion loaded from a fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    /// Service name used for filtering; matches the directory name.
    pub service: String,
    /// Unique identifier within the service (matches the filename stem).
    pub id: String,
    /// Human-readable description shown in test output.
    pub description: String,
    pub request: Request,
    pub expect: Expect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub method: String,
    /// Path including any query string, e.g. `/api/v1/doctors?page=2`.
    pub path: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Log in as this identity first and send the returned bearer token.
    pub auth: Option<AuthSpec>,
    pub body: Option<Value>,
}

/// Credentials of a seeded identity the runner logs in as before the
/// asserted request.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSpec {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Expect {
    /// Expected HTTP status code.
    pub status: u16,
    /// Expected response headers (subset match, extra headers are allowed).
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Exact JSON body match. Use `body_fields` when parts of the body are
    /// non-deterministic (ids, tokens, timestamps).
    pub body: Option<Value>,
    /// JSON-pointer paths that must hold the given values, e.g.
    /// `"/user/role": "doctor"`.
    #[serde(default)]
    pub body_fields: HashMap<String, Value>,
}

/// Load all fixture files under `{workspace_root}/contracts/http/`,
/// optionally filtered to a single service subdirectory. Fixtures come back
/// sorted by (service, id) so runs are reproducible.
pub fn load_all(workspace_root: &Path, service: Option<&str>) -> Result<Vec<Fixture>> {
    let http_dir = workspace_root.join("contracts/http");

    let service_dirs: Vec<_> = match service {
        Some(svc) => vec![http_dir.join(svc)],
        None => fs::read_dir(&http_dir)
            .with_context(|| format!("cannot open {}", http_dir.display()))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.path())
            .collect(),
    };

    let mut fixtures = Vec::new();
    for dir in service_dirs {
        if !dir.exists() {
            continue;
        }
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("cannot read {}", dir.display()))?
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                let fixture: Fixture = serde_json::from_str(&content)
                    .with_context(|| format!("invalid fixture JSON in {}", path.display()))?;
                fixtures.push(fixture);
            }
        }
    }

    fixtures.sort_by(|a, b| a.service.cmp(&b.service).then(a.id.cmp(&b.id)));
    Ok(fixtures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_a_full_fixture() {
        let raw = r#"{
            "service": "api",
            "id": "me_ok",
            "description": "authenticated lookup of the current user",
            "request": {
                "method": "GET",
                "path": "/api/v1/auth/me",
                "auth": { "email": "kamel.daoud@medworld.dz", "password": "password123" }
            },
            "expect": {
                "status": 200,
                "body_fields": { "/user/role": "doctor" }
            }
        }"#;
        let fixture: Fixture = serde_json::from_str(raw).unwrap();
        assert_eq!(fixture.id, "me_ok");
        assert_eq!(fixture.request.method, "GET");
        assert_eq!(
            fixture.request.auth.as_ref().map(|a| a.email.as_str()),
            Some("kamel.daoud@medworld.dz")
        );
        assert_eq!(fixture.expect.status, 200);
        assert!(fixture.expect.body.is_none());
        assert_eq!(
            fixture.expect.body_fields["/user/role"],
            serde_json::json!("doctor")
        );
    }

    #[test]
    fn should_default_headers_and_auth_to_empty() {
        let raw = r#"{
            "service": "api",
            "id": "health_ok",
            "description": "liveness probe",
            "request": { "method": "GET", "path": "/healthz", "body": null },
            "expect": { "status": 200, "body": null }
        }"#;
        let fixture: Fixture = serde_json::from_str(raw).unwrap();
        assert!(fixture.request.headers.is_empty());
        assert!(fixture.request.auth.is_none());
        assert!(fixture.expect.body_fields.is_empty());
    }
}
