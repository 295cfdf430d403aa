//! Session usecases: register, login, logout, request-token resolution and
//! the current-user lookup.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};

use medworld_auth::principal::Principal;
use medworld_auth::token;
use medworld_domain::role::Role;

use crate::domain::repository::{TokenRepository, UserRepository};
use crate::domain::types::{NewUser, UserView, parse_date, validate_email};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::present;

/// Name recorded on self-issued session token rows.
pub const TOKEN_NAME: &str = "auth_token";

// ── Password hashing ─────────────────────────────────────────────────────────

pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("hash password: {e}")))
}

/// A stored hash that does not parse counts as a mismatch, not an error;
/// the login fails either way.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

async fn issue_token<T: TokenRepository>(tokens: &T, user_id: i64) -> Result<String, ApiError> {
    let secret = token::new_secret();
    let digest = token::hash_secret(&secret);
    let id = tokens.create(user_id, TOKEN_NAME, &digest).await?;
    Ok(token::format_token(id, &secret))
}

/// A signed-in user plus the plaintext token handed to the client.
#[derive(Debug)]
pub struct AuthSession {
    pub user: UserView,
    pub token: String,
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub role: Option<String>,
}

pub struct RegisterUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub tokens: T,
}

impl<U: UserRepository, T: TokenRepository> RegisterUseCase<U, T> {
    pub async fn execute(&self, input: RegisterInput) -> Result<AuthSession, ApiError> {
        let mut errors = ValidationErrors::new();

        let first_name = present(input.first_name.as_deref());
        if first_name.is_none() {
            errors.required("first_name");
        }
        let last_name = present(input.last_name.as_deref());
        if last_name.is_none() {
            errors.required("last_name");
        }

        let email = match present(input.email.as_deref()) {
            None => {
                errors.required("email");
                None
            }
            Some(v) if !validate_email(v) => {
                errors.must_be_email("email");
                None
            }
            Some(v) => Some(v),
        };
        if let Some(v) = email {
            if self.users.email_taken(v, None).await? {
                errors.taken("email");
            }
        }

        let password = match present(input.password.as_deref()) {
            None => {
                errors.required("password");
                None
            }
            Some(v) if v.chars().count() < 6 => {
                errors.min_chars("password", 6);
                None
            }
            Some(v) if input.password_confirmation.as_deref() != Some(v) => {
                errors.confirmation_mismatch("password");
                None
            }
            Some(v) => Some(v),
        };

        let gender = match present(input.gender.as_deref()) {
            Some(v) if v != "male" && v != "female" => {
                errors.invalid_choice("gender");
                None
            }
            other => other,
        };

        let date_of_birth = match present(input.date_of_birth.as_deref()) {
            None => None,
            Some(v) => match parse_date(v) {
                Some(d) => Some(d),
                None => {
                    errors.must_be_date("date_of_birth");
                    None
                }
            },
        };

        let role = match present(input.role.as_deref()) {
            None => {
                errors.required("type");
                None
            }
            Some(v) => match Role::parse(v) {
                Some(r) => Some(r),
                None => {
                    errors.invalid_choice("type");
                    None
                }
            },
        };

        errors.into_result()?;
        let (Some(first_name), Some(last_name), Some(email), Some(password), Some(role)) =
            (first_name, last_name, email, password, role)
        else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "register validation passed with required fields missing"
            )));
        };

        let new = NewUser {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.to_owned(),
            password_hash: hash_password(password)?,
            phone_number: present(input.phone_number.as_deref()).map(str::to_owned),
            address: present(input.address.as_deref()).map(str::to_owned),
            gender: gender.map(str::to_owned),
            date_of_birth,
            role,
        };
        let id = self.users.create(&new).await?;
        let user = self.users.find_by_id(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("user {id} missing right after insert"))
        })?;
        let token = issue_token(&self.tokens, id).await?;
        Ok(AuthSession { user, token })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct LoginUseCase<U: UserRepository, T: TokenRepository> {
    pub users: U,
    pub tokens: T,
}

impl<U: UserRepository, T: TokenRepository> LoginUseCase<U, T> {
    pub async fn execute(&self, input: LoginInput) -> Result<AuthSession, ApiError> {
        let mut errors = ValidationErrors::new();
        let email = match present(input.email.as_deref()) {
            None => {
                errors.required("email");
                None
            }
            Some(v) if !validate_email(v) => {
                errors.must_be_email("email");
                None
            }
            Some(v) => Some(v),
        };
        let password = match present(input.password.as_deref()) {
            None => {
                errors.required("password");
                None
            }
            Some(v) => Some(v),
        };
        errors.into_result()?;
        let (Some(email), Some(password)) = (email, password) else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "login validation passed with required fields missing"
            )));
        };

        let credentials = self
            .users
            .find_credentials(email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;
        if !verify_password(password, &credentials.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        // The credentials row carries the bare user; the response embeds the
        // doctor/patient extensions, so re-read through the view query.
        let user = self
            .users
            .find_by_id(credentials.user.id)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;
        let token = issue_token(&self.tokens, user.user.id).await?;
        Ok(AuthSession { user, token })
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

/// Deletes exactly the presenting token row; other sessions of the same
/// user stay valid.
pub struct LogoutUseCase<T: TokenRepository> {
    pub tokens: T,
}

impl<T: TokenRepository> LogoutUseCase<T> {
    pub async fn execute(&self, raw_token: &str) -> Result<(), ApiError> {
        let Some((id, _)) = token::split_token(raw_token) else {
            return Ok(());
        };
        self.tokens.delete(id).await?;
        Ok(())
    }
}

// ── ResolveToken ─────────────────────────────────────────────────────────────

/// Turns a raw request credential into a [`Principal`]. Unknown and
/// malformed tokens resolve to anonymous, never to an error.
pub struct ResolveTokenUseCase<T: TokenRepository> {
    pub tokens: T,
}

impl<T: TokenRepository> ResolveTokenUseCase<T> {
    pub async fn execute(&self, raw_token: &str) -> Result<Option<Principal>, ApiError> {
        let Some((id, secret)) = token::split_token(raw_token) else {
            return Ok(None);
        };
        let Some((stored, user)) = self.tokens.find_with_user(id).await? else {
            return Ok(None);
        };
        if !token::digest_matches(secret, &stored.token_digest) {
            return Ok(None);
        }
        self.tokens.touch_last_used(id).await?;
        Ok(Some(Principal {
            user_id: user.id,
            role: user.role,
        }))
    }
}

// ── Me ───────────────────────────────────────────────────────────────────────

pub struct MeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> MeUseCase<U> {
    pub async fn execute(&self, user_id: i64) -> Result<UserView, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use medworld_domain::pagination::{Page, PageRequest};

    use super::*;
    use crate::domain::types::{AccessToken, Credentials, User, UserChanges};
    use crate::usecase::testutil::{empty_page, user};

    #[derive(Default)]
    struct MockUserRepo {
        user: Option<UserView>,
        credentials: Option<Credentials>,
        email_taken: bool,
        created: Mutex<Option<NewUser>>,
    }

    impl UserRepository for MockUserRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<UserView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<UserView>, ApiError> {
            Ok(self.user.clone())
        }
        async fn exists(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.user.is_some())
        }
        async fn email_taken(&self, _email: &str, _ignore: Option<i64>) -> Result<bool, ApiError> {
            Ok(self.email_taken)
        }
        async fn find_credentials(&self, _email: &str) -> Result<Option<Credentials>, ApiError> {
            Ok(self.credentials.clone())
        }
        async fn create(&self, new: &NewUser) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(1)
        }
        async fn update(&self, _id: i64, _changes: &UserChanges) -> Result<(), ApiError> {
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct MockTokenRepo {
        stored: Option<(AccessToken, User)>,
        created_for: Mutex<Option<i64>>,
        touched: Mutex<bool>,
        deleted: Mutex<Option<i64>>,
    }

    impl TokenRepository for MockTokenRepo {
        async fn create(&self, user_id: i64, _name: &str, _digest: &str) -> Result<i64, ApiError> {
            *self.created_for.lock().unwrap() = Some(user_id);
            Ok(7)
        }
        async fn find_with_user(&self, _id: i64) -> Result<Option<(AccessToken, User)>, ApiError> {
            Ok(self.stored.clone())
        }
        async fn touch_last_used(&self, _id: i64) -> Result<(), ApiError> {
            *self.touched.lock().unwrap() = true;
            Ok(())
        }
        async fn delete(&self, id: i64) -> Result<bool, ApiError> {
            *self.deleted.lock().unwrap() = Some(id);
            Ok(true)
        }
    }

    fn register_input() -> RegisterInput {
        RegisterInput {
            first_name: Some("Amina".into()),
            last_name: Some("Benali".into()),
            email: Some("amina.benali@example.dz".into()),
            password: Some("secret123".into()),
            password_confirmation: Some("secret123".into()),
            phone_number: None,
            address: None,
            gender: Some("female".into()),
            date_of_birth: Some("1990-04-02".into()),
            role: Some("patient".into()),
        }
    }

    #[tokio::test]
    async fn should_register_and_issue_token() {
        let usecase = RegisterUseCase {
            users: MockUserRepo {
                user: Some(UserView::from(user(1, Role::Patient))),
                ..Default::default()
            },
            tokens: MockTokenRepo::default(),
        };
        let session = usecase.execute(register_input()).await.unwrap();
        assert!(session.token.starts_with("7|"));
        assert_eq!(*usecase.tokens.created_for.lock().unwrap(), Some(1));

        let stored = usecase.users.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.role, Role::Patient);
        assert_ne!(stored.password_hash, "secret123");
        assert!(verify_password("secret123", &stored.password_hash));
    }

    #[tokio::test]
    async fn should_reject_register_when_password_confirmation_differs() {
        let usecase = RegisterUseCase {
            users: MockUserRepo::default(),
            tokens: MockTokenRepo::default(),
        };
        let mut input = register_input();
        input.password_confirmation = Some("something-else".into());
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["password"],
            vec!["The password field confirmation does not match."]
        );
    }

    #[tokio::test]
    async fn should_reject_register_with_taken_email() {
        let usecase = RegisterUseCase {
            users: MockUserRepo {
                email_taken: true,
                ..Default::default()
            },
            tokens: MockTokenRepo::default(),
        };
        let Err(ApiError::Validation(fields)) = usecase.execute(register_input()).await else {
            panic!("expected validation failure");
        };
        assert_eq!(fields["email"], vec!["The email has already been taken."]);
    }

    #[tokio::test]
    async fn should_collect_every_register_field_error_at_once() {
        let usecase = RegisterUseCase {
            users: MockUserRepo::default(),
            tokens: MockTokenRepo::default(),
        };
        let input = RegisterInput {
            first_name: None,
            last_name: Some("   ".into()),
            email: Some("not-an-email".into()),
            password: Some("short".into()),
            password_confirmation: None,
            phone_number: None,
            address: None,
            gender: Some("other".into()),
            date_of_birth: Some("someday".into()),
            role: None,
        };
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        let keys: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "date_of_birth",
                "email",
                "first_name",
                "gender",
                "last_name",
                "password",
                "type"
            ]
        );
        assert_eq!(
            fields["password"],
            vec!["The password field must be at least 6 characters."]
        );
    }

    #[tokio::test]
    async fn should_login_with_correct_password() {
        let account = user(3, Role::Doctor);
        let usecase = LoginUseCase {
            users: MockUserRepo {
                user: Some(UserView::from(account.clone())),
                credentials: Some(Credentials {
                    user: account,
                    password_hash: hash_password("password123").unwrap(),
                }),
                ..Default::default()
            },
            tokens: MockTokenRepo::default(),
        };
        let session = usecase
            .execute(LoginInput {
                email: Some("user3@example.dz".into()),
                password: Some("password123".into()),
            })
            .await
            .unwrap();
        assert_eq!(session.user.user.id, 3);
        assert!(session.token.starts_with("7|"));
        assert_eq!(*usecase.tokens.created_for.lock().unwrap(), Some(3));
    }

    #[tokio::test]
    async fn should_reject_login_with_wrong_password() {
        let account = user(3, Role::Doctor);
        let usecase = LoginUseCase {
            users: MockUserRepo {
                credentials: Some(Credentials {
                    user: account,
                    password_hash: hash_password("password123").unwrap(),
                }),
                ..Default::default()
            },
            tokens: MockTokenRepo::default(),
        };
        let result = usecase
            .execute(LoginInput {
                email: Some("user3@example.dz".into()),
                password: Some("letmein".into()),
            })
            .await;
        assert!(matches!(result, Err(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn should_reject_login_with_unknown_email() {
        let usecase = LoginUseCase {
            users: MockUserRepo::default(),
            tokens: MockTokenRepo::default(),
        };
        let result = usecase
            .execute(LoginInput {
                email: Some("nobody@example.dz".into()),
                password: Some("password123".into()),
            })
            .await;
        assert!(matches!(result, Err(ApiError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn should_validate_login_shape_before_checking_credentials() {
        let usecase = LoginUseCase {
            users: MockUserRepo::default(),
            tokens: MockTokenRepo::default(),
        };
        let Err(ApiError::Validation(fields)) = usecase
            .execute(LoginInput {
                email: Some("not-an-email".into()),
                password: None,
            })
            .await
        else {
            panic!("expected validation failure");
        };
        let keys: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["email", "password"]);
    }

    #[tokio::test]
    async fn should_resolve_principal_and_touch_last_used() {
        let secret = token::new_secret();
        let usecase = ResolveTokenUseCase {
            tokens: MockTokenRepo {
                stored: Some((
                    AccessToken {
                        id: 7,
                        user_id: 3,
                        token_digest: token::hash_secret(&secret),
                    },
                    user(3, Role::Assistant),
                )),
                ..Default::default()
            },
        };
        let principal = usecase
            .execute(&token::format_token(7, &secret))
            .await
            .unwrap();
        assert_eq!(
            principal,
            Some(Principal {
                user_id: 3,
                role: Role::Assistant
            })
        );
        assert!(*usecase.tokens.touched.lock().unwrap());
    }

    #[tokio::test]
    async fn should_resolve_anonymous_for_wrong_secret() {
        let usecase = ResolveTokenUseCase {
            tokens: MockTokenRepo {
                stored: Some((
                    AccessToken {
                        id: 7,
                        user_id: 3,
                        token_digest: token::hash_secret(&token::new_secret()),
                    },
                    user(3, Role::Patient),
                )),
                ..Default::default()
            },
        };
        let principal = usecase.execute("7|wrong-secret").await.unwrap();
        assert_eq!(principal, None);
        assert!(!*usecase.tokens.touched.lock().unwrap());
    }

    #[tokio::test]
    async fn should_resolve_anonymous_for_malformed_token() {
        let usecase = ResolveTokenUseCase {
            tokens: MockTokenRepo::default(),
        };
        assert_eq!(usecase.execute("no-separator").await.unwrap(), None);
        assert_eq!(usecase.execute("abc|secret").await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_delete_only_the_presenting_token_on_logout() {
        let usecase = LogoutUseCase {
            tokens: MockTokenRepo::default(),
        };
        usecase.execute("42|s3cret").await.unwrap();
        assert_eq!(*usecase.tokens.deleted.lock().unwrap(), Some(42));
    }

    #[tokio::test]
    async fn should_return_unauthenticated_when_me_user_vanished() {
        let usecase = MeUseCase {
            users: MockUserRepo::default(),
        };
        let result = usecase.execute(3).await;
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }
}
