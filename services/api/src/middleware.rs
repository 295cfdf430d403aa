//! Request authentication and per-route role gates.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use medworld_auth::principal::{Principal, bearer_or_cookie};
use medworld_domain::role::Role;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::auth::ResolveTokenUseCase;

// Route allow lists, in the order the 403 message names them.
pub const ANY_USER: &[Role] = &[];
pub const ADMIN: &[Role] = &[Role::Admin];
pub const ADMIN_DOCTOR: &[Role] = &[Role::Admin, Role::Doctor];
pub const DOCTOR_ADMIN: &[Role] = &[Role::Doctor, Role::Admin];
pub const PATIENT_ADMIN: &[Role] = &[Role::Patient, Role::Admin];
pub const SUPERADMIN_ADMIN: &[Role] = &[Role::Superadmin, Role::Admin];
pub const DOCTOR_PATIENT_ADMIN: &[Role] = &[Role::Doctor, Role::Patient, Role::Admin];
pub const PATIENT_DOCTOR_ADMIN: &[Role] = &[Role::Patient, Role::Doctor, Role::Admin];

/// Resolves the request credential (bearer header first, `auth_token` cookie
/// as fallback) and attaches the [`Principal`] as a request extension.
/// Anonymous and bad-token requests pass through untouched; the role gates
/// decide whether that matters.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = bearer_or_cookie(request.headers(), &jar) {
        let usecase = ResolveTokenUseCase {
            tokens: state.token_repo(),
        };
        if let Some(principal) = usecase.execute(&token).await? {
            request.extensions_mut().insert(principal);
        }
    }
    Ok(next.run(request).await)
}

/// Role gate for a route group. Mounted with `route_layer` after
/// [`authenticate`], so it fires before the handler even for ids that do not
/// exist: 401/403 always precede 404.
pub async fn require_role(
    required: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request.extensions().get::<Principal>().copied();
    authorize(principal, required)?;
    Ok(next.run(request).await)
}

/// An empty allow list admits any authenticated user. Anonymous callers get
/// a 401 that does not disclose which roles the route wants.
pub fn authorize(
    principal: Option<Principal>,
    required: &'static [Role],
) -> Result<Principal, ApiError> {
    let Some(principal) = principal else {
        return Err(ApiError::Unauthenticated);
    };
    if required.is_empty() || required.contains(&principal.role) {
        Ok(principal)
    } else {
        Err(ApiError::Forbidden {
            required,
            actual: principal.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal { user_id: 1, role }
    }

    #[test]
    fn should_admit_any_authenticated_user_on_an_empty_list() {
        let result = authorize(Some(principal(Role::Patient)), ANY_USER);
        assert_eq!(result.unwrap().role, Role::Patient);
    }

    #[test]
    fn should_reject_anonymous_callers_without_naming_roles() {
        let result = authorize(None, ADMIN);
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn should_admit_every_role_in_the_list() {
        for role in [Role::Patient, Role::Doctor, Role::Admin] {
            assert!(authorize(Some(principal(role)), PATIENT_DOCTOR_ADMIN).is_ok());
        }
    }

    #[test]
    fn should_reject_roles_outside_the_list() {
        let result = authorize(Some(principal(Role::Assistant)), DOCTOR_ADMIN);
        let Err(ApiError::Forbidden { required, actual }) = result else {
            panic!("expected Forbidden");
        };
        assert_eq!(required, DOCTOR_ADMIN);
        assert_eq!(actual, Role::Assistant);
    }

    #[test]
    fn should_keep_superadmin_subject_to_the_list() {
        // Superadmin is not an implicit bypass; it must be named to pass.
        assert!(authorize(Some(principal(Role::Superadmin)), ADMIN).is_err());
        assert!(authorize(Some(principal(Role::Superadmin)), SUPERADMIN_ADMIN).is_ok());
    }
}
