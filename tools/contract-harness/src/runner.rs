//! HTTP request runner: sends one fixture request and checks the response.

use reqwest::Client;
use serde_json::Value;

use crate::fixture::{AuthSpec, Fixture};

/// Result of running a single fixture assertion.
pub struct RunResult {
    pub expected_status: u16,
    pub actual_status: Option<u16>,
    /// Headers that were expected but missing or carrying the wrong value.
    pub header_mismatches: Vec<String>,
    /// Failures from `expect.body` and `expect.body_fields`.
    pub body_mismatches: Vec<String>,
    /// Set when the request could not be sent (e.g. connection refused).
    pub error: Option<String>,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.error.is_none()
            && self.actual_status == Some(self.expected_status)
            && self.header_mismatches.is_empty()
            && self.body_mismatches.is_empty()
    }

    fn failed(expected_status: u16, error: String) -> Self {
        Self {
            expected_status,
            actual_status: None,
            header_mismatches: Vec::new(),
            body_mismatches: Vec::new(),
            error: Some(error),
        }
    }
}

pub struct Runner {
    client: Client,
    base_url: String,
}

impl Runner {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub async fn run(&self, fixture: &Fixture) -> RunResult {
        let expected_status = fixture.expect.status;

        let method =
            match reqwest::Method::from_bytes(fixture.request.method.to_uppercase().as_bytes()) {
                Ok(m) => m,
                Err(_) => {
                    return RunResult::failed(
                        expected_status,
                        format!("unknown HTTP method: {}", fixture.request.method),
                    );
                }
            };

        let bearer = match &fixture.request.auth {
            Some(auth) => match self.login(auth).await {
                Ok(token) => Some(token),
                Err(e) => return RunResult::failed(expected_status, e),
            },
            None => None,
        };

        let url = format!("{}{}", self.base_url, fixture.request.path);
        let mut req = self.client.request(method, &url);
        for (k, v) in &fixture.request.headers {
            req = req.header(k, v);
        }
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = &fixture.request.body {
            req = req.json(body);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => return RunResult::failed(expected_status, e.to_string()),
        };

        let actual_status = resp.status().as_u16();
        let headers = resp.headers().clone();

        let mut header_mismatches = Vec::new();
        for (name, expected_val) in &fixture.expect.headers {
            match headers.get(name.as_str()) {
                Some(actual_val) if actual_val.to_str().unwrap_or("") == expected_val => {}
                Some(actual_val) => {
                    header_mismatches.push(format!(
                        "{name}: expected {:?}, got {:?}",
                        expected_val,
                        actual_val.to_str().unwrap_or("<non-utf8>")
                    ));
                }
                None => {
                    header_mismatches.push(format!("{name}: missing (expected {expected_val:?})"));
                }
            }
        }

        let mut body_mismatches = Vec::new();
        if fixture.expect.body.is_some() || !fixture.expect.body_fields.is_empty() {
            let body_text = resp.text().await.unwrap_or_default();
            let actual_body: Value = serde_json::from_str(&body_text).unwrap_or(Value::Null);

            if let Some(expected_body) = &fixture.expect.body {
                if &actual_body != expected_body {
                    body_mismatches
                        .push(format!("body: expected {expected_body}, got {actual_body}"));
                }
            }
            for (pointer, expected_val) in &fixture.expect.body_fields {
                match actual_body.pointer(pointer) {
                    Some(actual_val) if actual_val == expected_val => {}
                    Some(actual_val) => {
                        body_mismatches.push(format!(
                            "{pointer}: expected {expected_val}, got {actual_val}"
                        ));
                    }
                    None => {
                        body_mismatches
                            .push(format!("{pointer}: missing (expected {expected_val})"));
                    }
                }
            }
        }

        RunResult {
            expected_status,
            actual_status: Some(actual_status),
            header_mismatches,
            body_mismatches,
            error: None,
        }
    }

    /// Log in as the fixture's identity and return the bearer token.
    async fn login(&self, auth: &AuthSpec) -> Result<String, String> {
        let url = format!("{}/api/v1/auth/login", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "email": auth.email,
                "password": auth.password,
            }))
            .send()
            .await
            .map_err(|e| format!("login as {} failed: {e}", auth.email))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("login as {} answered {status}", auth.email));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| format!("login as {} returned unreadable JSON: {e}", auth.email))?;
        body.get("token")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| format!("login as {} returned no token", auth.email))
    }
}
