use medworld_domain::pagination::{Page, PageRequest};
use medworld_domain::role::Role;

use crate::domain::repository::UserRepository;
use crate::domain::types::{NewUser, UserChanges, UserView, parse_date, validate_email};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::auth::hash_password;
use crate::usecase::{present, present_owned};

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<UserView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<UserView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("User"))
    }
}

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub role: Option<String>,
}

pub struct CreateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> CreateUserUseCase<R> {
    pub async fn execute(&self, input: CreateUserInput) -> Result<UserView, ApiError> {
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
            if self.repo.email_taken(v, None).await? {
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
                "user validation passed with required fields missing"
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
        let id = self.repo.create(&new).await?;
        self.repo.find_by_id(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("user {id} missing right after insert"))
        })
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

/// Patch payload. The nullable columns are doubly wrapped: the outer level
/// distinguishes "field absent" from "field set to null".
#[derive(Default)]
pub struct UpdateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub gender: Option<Option<String>>,
    pub date_of_birth: Option<Option<String>>,
}

pub struct UpdateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> UpdateUserUseCase<R> {
    pub async fn execute(&self, id: i64, input: UpdateUserInput) -> Result<UserView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("User"));
        }

        let mut errors = ValidationErrors::new();

        let email = match present_owned(input.email) {
            Some(v) if !validate_email(&v) => {
                errors.must_be_email("email");
                None
            }
            other => other,
        };
        if let Some(v) = &email {
            // Uniqueness ignores the row being edited.
            if self.repo.email_taken(v, Some(id)).await? {
                errors.taken("email");
            }
        }

        let password = match present_owned(input.password) {
            Some(v) if v.chars().count() < 6 => {
                errors.min_chars("password", 6);
                None
            }
            other => other,
        };

        let gender = input.gender.map(present_owned);
        if let Some(Some(v)) = &gender {
            if v != "male" && v != "female" {
                errors.invalid_choice("gender");
            }
        }

        let date_of_birth = match input.date_of_birth.map(present_owned) {
            None => None,
            Some(None) => Some(None),
            Some(Some(v)) => match parse_date(&v) {
                Some(d) => Some(Some(d)),
                None => {
                    errors.must_be_date("date_of_birth");
                    None
                }
            },
        };

        errors.into_result()?;

        let changes = UserChanges {
            first_name: present_owned(input.first_name),
            last_name: present_owned(input.last_name),
            email,
            password_hash: password.as_deref().map(hash_password).transpose()?,
            phone_number: input.phone_number.map(present_owned),
            address: input.address.map(present_owned),
            gender,
            date_of_birth,
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("User"))
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> DeleteUserUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("User"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::types::Credentials;
    use crate::usecase::auth::verify_password;
    use crate::usecase::testutil::{empty_page, user};

    #[derive(Default)]
    struct MockUserRepo {
        user: Option<UserView>,
        email_taken: bool,
        created: Mutex<Option<NewUser>>,
        updated: Mutex<Option<UserChanges>>,
        email_checked: Mutex<Option<(String, Option<i64>)>>,
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
        async fn email_taken(&self, email: &str, ignore: Option<i64>) -> Result<bool, ApiError> {
            *self.email_checked.lock().unwrap() = Some((email.to_owned(), ignore));
            Ok(self.email_taken)
        }
        async fn find_credentials(&self, _email: &str) -> Result<Option<Credentials>, ApiError> {
            Ok(None)
        }
        async fn create(&self, new: &NewUser) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(1)
        }
        async fn update(&self, _id: i64, changes: &UserChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.user.is_some())
        }
    }

    fn repo_with_user() -> MockUserRepo {
        MockUserRepo {
            user: Some(UserView::from(user(5, Role::Admin))),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn should_create_user_and_hash_the_password() {
        let usecase = CreateUserUseCase {
            repo: repo_with_user(),
        };
        let view = usecase
            .execute(CreateUserInput {
                first_name: Some("Kamel".into()),
                last_name: Some("Daoud".into()),
                email: Some("kamel.daoud@example.dz".into()),
                password: Some("secret123".into()),
                phone_number: None,
                address: None,
                gender: Some("male".into()),
                date_of_birth: None,
                role: Some("doctor".into()),
            })
            .await
            .unwrap();
        assert_eq!(view.user.id, 5);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.role, Role::Doctor);
        assert!(verify_password("secret123", &stored.password_hash));
    }

    #[tokio::test]
    async fn should_collect_required_field_errors_on_create() {
        let usecase = CreateUserUseCase {
            repo: MockUserRepo::default(),
        };
        let Err(ApiError::Validation(fields)) = usecase
            .execute(CreateUserInput {
                first_name: None,
                last_name: None,
                email: None,
                password: None,
                phone_number: None,
                address: None,
                gender: None,
                date_of_birth: None,
                role: None,
            })
            .await
        else {
            panic!("expected validation failure");
        };
        let keys: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["email", "first_name", "last_name", "password", "type"]
        );
    }

    #[tokio::test]
    async fn should_return_not_found_before_validating_a_patch() {
        let usecase = UpdateUserUseCase {
            repo: MockUserRepo::default(),
        };
        let result = usecase
            .execute(
                5,
                UpdateUserInput {
                    email: Some("broken".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::NotFound("User"))));
    }

    #[tokio::test]
    async fn should_ignore_own_email_when_checking_uniqueness() {
        let usecase = UpdateUserUseCase {
            repo: repo_with_user(),
        };
        usecase
            .execute(
                5,
                UpdateUserInput {
                    email: Some("user5@example.dz".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let checked = usecase.repo.email_checked.lock().unwrap().clone();
        assert_eq!(checked, Some(("user5@example.dz".into(), Some(5))));
    }

    #[tokio::test]
    async fn should_patch_only_supplied_fields() {
        let usecase = UpdateUserUseCase {
            repo: repo_with_user(),
        };
        usecase
            .execute(
                5,
                UpdateUserInput {
                    first_name: Some("Nour".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.first_name.as_deref(), Some("Nour"));
        assert_eq!(changes.email, None);
        assert_eq!(changes.phone_number, None);
        assert_eq!(changes.password_hash, None);
    }

    #[tokio::test]
    async fn should_clear_nullable_fields_on_explicit_null() {
        let usecase = UpdateUserUseCase {
            repo: repo_with_user(),
        };
        usecase
            .execute(
                5,
                UpdateUserInput {
                    phone_number: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.phone_number, Some(None));
    }

    #[tokio::test]
    async fn should_rehash_password_on_update() {
        let usecase = UpdateUserUseCase {
            repo: repo_with_user(),
        };
        usecase
            .execute(
                5,
                UpdateUserInput {
                    password: Some("nouveau-mdp".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        let hash = changes.password_hash.unwrap();
        assert_ne!(hash, "nouveau-mdp");
        assert!(verify_password("nouveau-mdp", &hash));
    }

    #[tokio::test]
    async fn should_report_not_found_on_repeated_delete() {
        let usecase = DeleteUserUseCase {
            repo: MockUserRepo::default(),
        };
        let result = usecase.execute(5).await;
        assert!(matches!(result, Err(ApiError::NotFound("User"))));
    }

    #[tokio::test]
    async fn should_return_user_view_by_id() {
        let usecase = GetUserUseCase {
            repo: repo_with_user(),
        };
        let view = usecase.execute(5).await.unwrap();
        assert_eq!(view.user.id, 5);
        let missing = GetUserUseCase {
            repo: MockUserRepo::default(),
        }
        .execute(5)
        .await;
        assert!(matches!(missing, Err(ApiError::NotFound("User"))));
    }
}
