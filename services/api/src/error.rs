use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use medworld_domain::role::Role;
use serde_json::json;

/// Field name to human-readable messages, ordered by field name so response
/// bodies are stable across runs.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// No usable credential on the request, or the token did not resolve to
    /// a stored one.
    #[error("Unauthenticated.")]
    Unauthenticated,

    /// Login with an unknown email or a wrong password.
    #[error("Unauthorized")]
    InvalidCredentials,

    /// Authenticated caller whose role is not in the route's allow list.
    #[error("Unauthorized. Required role: {}", join_roles(.required))]
    Forbidden {
        required: &'static [Role],
        actual: Role,
    },

    /// Unique-constraint race lost after validation had already passed.
    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log 500s only. tower-http's TraceLayer already records method, uri
        // and status for every request; 4xx are expected client outcomes and
        // logging them again here would be noise.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            Self::Validation(errors) => json!({
                "message": "Validation failed",
                "errors": errors,
            }),
            Self::Forbidden { actual, .. } => json!({
                "message": self.to_string(),
                "user_role": actual,
            }),
            // Never echo the underlying cause to the client.
            Self::Internal(_) => json!({ "message": "Internal server error" }),
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Accumulates per-field validation messages across all checks of a request
/// body, so the client sees every problem at once instead of one per round
/// trip.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    fields: FieldErrors,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn required(&mut self, field: &str) {
        self.add(field, format!("The {} field is required.", label(field)));
    }

    pub fn must_be_email(&mut self, field: &str) {
        self.add(
            field,
            format!("The {} field must be a valid email address.", label(field)),
        );
    }

    pub fn min_chars(&mut self, field: &str, min: usize) {
        self.add(
            field,
            format!(
                "The {} field must be at least {min} characters.",
                label(field)
            ),
        );
    }

    pub fn max_chars(&mut self, field: &str, max: usize) {
        self.add(
            field,
            format!(
                "The {} field must not be greater than {max} characters.",
                label(field)
            ),
        );
    }

    pub fn min_value(&mut self, field: &str, min: i64) {
        self.add(
            field,
            format!("The {} field must be at least {min}.", label(field)),
        );
    }

    pub fn taken(&mut self, field: &str) {
        self.add(
            field,
            format!("The {} has already been taken.", label(field)),
        );
    }

    /// Value outside the accepted set, whether a fixed enum or a referenced
    /// row that does not exist. Both cases use the same wording.
    pub fn invalid_choice(&mut self, field: &str) {
        self.add(field, format!("The selected {} is invalid.", label(field)));
    }

    pub fn must_be_date(&mut self, field: &str) {
        self.add(
            field,
            format!("The {} field must be a valid date.", label(field)),
        );
    }

    pub fn must_be_array(&mut self, field: &str) {
        self.add(
            field,
            format!("The {} field must be an array.", label(field)),
        );
    }

    pub fn must_match_format(&mut self, field: &str, format: &str) {
        self.add(
            field,
            format!(
                "The {} field must match the format {format}.",
                label(field)
            ),
        );
    }

    pub fn confirmation_mismatch(&mut self, field: &str) {
        self.add(
            field,
            format!(
                "The {} field confirmation does not match.",
                label(field)
            ),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.fields))
        }
    }
}

// Messages spell field names with spaces: "first_name" reads as "first name".
fn label(field: &str) -> String {
    field.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn assert_error(err: ApiError, status: StatusCode, body: serde_json::Value) {
        let resp = err.into_response();
        assert_eq!(resp.status(), status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let actual: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(actual, body);
    }

    #[tokio::test]
    async fn should_return_422_with_field_errors() {
        let mut v = ValidationErrors::new();
        v.required("first_name");
        v.must_be_email("email");
        let Err(err) = v.into_result() else {
            panic!("expected validation to fail");
        };
        assert_error(
            err,
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "message": "Validation failed",
                "errors": {
                    "email": ["The email field must be a valid email address."],
                    "first_name": ["The first name field is required."],
                },
            }),
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_404_with_entity_name() {
        assert_error(
            ApiError::NotFound("Doctor"),
            StatusCode::NOT_FOUND,
            json!({ "message": "Doctor not found" }),
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_401_with_trailing_period_when_unauthenticated() {
        assert_error(
            ApiError::Unauthenticated,
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Unauthenticated." }),
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_401_unauthorized_for_bad_credentials() {
        assert_error(
            ApiError::InvalidCredentials,
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Unauthorized" }),
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_403_with_required_roles_and_user_role() {
        assert_error(
            ApiError::Forbidden {
                required: &[Role::Doctor, Role::Admin],
                actual: Role::Patient,
            },
            StatusCode::FORBIDDEN,
            json!({
                "message": "Unauthorized. Required role: doctor, admin",
                "user_role": "patient",
            }),
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_409_on_conflict() {
        assert_error(
            ApiError::Conflict("Consultation"),
            StatusCode::CONFLICT,
            json!({ "message": "Consultation already exists" }),
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_500_without_leaking_the_cause() {
        assert_error(
            ApiError::Internal(anyhow::anyhow!("connection refused")),
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "Internal server error" }),
        )
        .await;
    }

    #[test]
    fn should_accumulate_multiple_messages_per_field() {
        let mut v = ValidationErrors::new();
        v.required("password");
        v.min_chars("password", 8);
        let Err(ApiError::Validation(fields)) = v.into_result() else {
            panic!("expected validation to fail");
        };
        assert_eq!(
            fields["password"],
            vec![
                "The password field is required.",
                "The password field must be at least 8 characters.",
            ]
        );
    }

    #[test]
    fn should_spell_messages_with_spaces_in_field_names() {
        let mut v = ValidationErrors::new();
        v.must_match_format("appointment_date", "Y-m-d H:i:s");
        v.taken("email");
        v.invalid_choice("type");
        v.confirmation_mismatch("password");
        v.min_value("amount", 0);
        let Err(ApiError::Validation(fields)) = v.into_result() else {
            panic!("expected validation to fail");
        };
        assert_eq!(
            fields["appointment_date"],
            vec!["The appointment date field must match the format Y-m-d H:i:s."]
        );
        assert_eq!(fields["email"], vec!["The email has already been taken."]);
        assert_eq!(fields["type"], vec!["The selected type is invalid."]);
        assert_eq!(
            fields["password"],
            vec!["The password field confirmation does not match."]
        );
        assert_eq!(
            fields["amount"],
            vec!["The amount field must be at least 0."]
        );
    }

    #[test]
    fn should_convert_empty_builder_to_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
        assert!(ValidationErrors::new().is_empty());
    }

    #[test]
    fn should_expose_stable_kind_names() {
        assert_eq!(ApiError::Unauthenticated.kind(), "UNAUTHENTICATED");
        assert_eq!(ApiError::NotFound("User").kind(), "NOT_FOUND");
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).kind(),
            "INTERNAL"
        );
    }
}
