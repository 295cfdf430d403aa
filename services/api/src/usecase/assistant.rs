use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AssistantRepository, RefLookupPort};
use crate::domain::types::{AssistantChanges, AssistantView, DoctorView, NewAssistant};
use crate::error::{ApiError, ValidationErrors};

// ── ListAssistants ───────────────────────────────────────────────────────────

pub struct ListAssistantsUseCase<R: AssistantRepository> {
    pub repo: R,
}

impl<R: AssistantRepository> ListAssistantsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<AssistantView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetAssistant ─────────────────────────────────────────────────────────────

pub struct GetAssistantUseCase<R: AssistantRepository> {
    pub repo: R,
}

impl<R: AssistantRepository> GetAssistantUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<AssistantView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Assistant"))
    }
}

// ── CreateAssistant ──────────────────────────────────────────────────────────

pub struct CreateAssistantInput {
    pub user_id: Option<i64>,
    pub cabinet_id: Option<i64>,
}

pub struct CreateAssistantUseCase<R: AssistantRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: AssistantRepository, L: RefLookupPort> CreateAssistantUseCase<R, L> {
    pub async fn execute(&self, input: CreateAssistantInput) -> Result<AssistantView, ApiError> {
        let mut errors = ValidationErrors::new();

        let user_id = match input.user_id {
            None => {
                errors.required("user_id");
                None
            }
            Some(v) => {
                if self.refs.user_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("user_id");
                    None
                }
            }
        };
        let cabinet_id = match input.cabinet_id {
            None => {
                errors.required("cabinet_id");
                None
            }
            Some(v) => {
                if self.refs.cabinet_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("cabinet_id");
                    None
                }
            }
        };

        errors.into_result()?;
        let (Some(user_id), Some(cabinet_id)) = (user_id, cabinet_id) else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "assistant validation passed with required fields missing"
            )));
        };

        let new = NewAssistant { user_id, cabinet_id };
        let id = self.repo.create(&new).await?;
        self.repo.find_by_id(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("assistant {id} missing right after insert"))
        })
    }
}

// ── UpdateAssistant ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateAssistantInput {
    pub cabinet_id: Option<i64>,
}

pub struct UpdateAssistantUseCase<R: AssistantRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: AssistantRepository, L: RefLookupPort> UpdateAssistantUseCase<R, L> {
    pub async fn execute(
        &self,
        id: i64,
        input: UpdateAssistantInput,
    ) -> Result<AssistantView, ApiError> {
        if self.repo.find_base(id).await?.is_none() {
            return Err(ApiError::NotFound("Assistant"));
        }

        let mut errors = ValidationErrors::new();
        let cabinet_id = match input.cabinet_id {
            None => None,
            Some(v) => {
                if self.refs.cabinet_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("cabinet_id");
                    None
                }
            }
        };
        errors.into_result()?;

        let changes = AssistantChanges { cabinet_id };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Assistant"))
    }
}

// ── DeleteAssistant ──────────────────────────────────────────────────────────

pub struct DeleteAssistantUseCase<R: AssistantRepository> {
    pub repo: R,
}

impl<R: AssistantRepository> DeleteAssistantUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Assistant"))
        }
    }
}

// ── GetAssistantDoctors ──────────────────────────────────────────────────────

pub struct GetAssistantDoctorsUseCase<R: AssistantRepository> {
    pub repo: R,
}

impl<R: AssistantRepository> GetAssistantDoctorsUseCase<R> {
    pub async fn execute(
        &self,
        assistant_id: i64,
        page: PageRequest,
    ) -> Result<Page<DoctorView>, ApiError> {
        if self.repo.find_base(assistant_id).await?.is_none() {
            return Err(ApiError::NotFound("Assistant"));
        }
        self.repo.doctors(assistant_id, page).await
    }
}

// ── Attach / detach ──────────────────────────────────────────────────────────

pub struct AttachDoctorInput {
    pub doctor_id: Option<i64>,
}

/// Links a doctor to an assistant. Attaching an already linked pair is a
/// no-op, not an error.
pub struct AttachDoctorUseCase<R: AssistantRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: AssistantRepository, L: RefLookupPort> AttachDoctorUseCase<R, L> {
    pub async fn execute(
        &self,
        assistant_id: i64,
        input: AttachDoctorInput,
    ) -> Result<AssistantView, ApiError> {
        let assistant = self
            .repo
            .find_base(assistant_id)
            .await?
            .ok_or(ApiError::NotFound("Assistant"))?;

        let doctor_id = validate_doctor_ref(&self.refs, input.doctor_id).await?;
        self.repo.attach(assistant_id, doctor_id).await?;

        let doctors = self.repo.attached_doctors(assistant_id).await?;
        Ok(AssistantView {
            assistant,
            user: None,
            cabinet: None,
            doctors: Some(doctors),
        })
    }
}

/// Unlinks a doctor from an assistant. Detaching a pair that was never
/// linked is a no-op, not an error.
pub struct DetachDoctorUseCase<R: AssistantRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: AssistantRepository, L: RefLookupPort> DetachDoctorUseCase<R, L> {
    pub async fn execute(
        &self,
        assistant_id: i64,
        input: AttachDoctorInput,
    ) -> Result<AssistantView, ApiError> {
        let assistant = self
            .repo
            .find_base(assistant_id)
            .await?
            .ok_or(ApiError::NotFound("Assistant"))?;

        let doctor_id = validate_doctor_ref(&self.refs, input.doctor_id).await?;
        self.repo.detach(assistant_id, doctor_id).await?;

        let doctors = self.repo.attached_doctors(assistant_id).await?;
        Ok(AssistantView {
            assistant,
            user: None,
            cabinet: None,
            doctors: Some(doctors),
        })
    }
}

async fn validate_doctor_ref<L: RefLookupPort>(
    refs: &L,
    doctor_id: Option<i64>,
) -> Result<i64, ApiError> {
    let mut errors = ValidationErrors::new();
    let doctor_id = match doctor_id {
        None => {
            errors.required("doctor_id");
            None
        }
        Some(v) => {
            if refs.doctor_exists(v).await? {
                Some(v)
            } else {
                errors.invalid_choice("doctor_id");
                None
            }
        }
    };
    errors.into_result()?;
    doctor_id.ok_or_else(|| {
        ApiError::Internal(anyhow::anyhow!(
            "doctor reference validation passed without a doctor id"
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::types::{Assistant, Doctor};
    use crate::usecase::testutil::{StubRefs, assistant, doctor, empty_page};

    #[derive(Default)]
    struct MockAssistantRepo {
        base: Option<Assistant>,
        doctors: Vec<Doctor>,
        attach_inserts: bool,
        created: Mutex<Option<NewAssistant>>,
        updated: Mutex<Option<AssistantChanges>>,
        attached: Mutex<Option<(i64, i64)>>,
        detached: Mutex<Option<(i64, i64)>>,
    }

    impl AssistantRepository for MockAssistantRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<AssistantView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<AssistantView>, ApiError> {
            Ok(self.base.clone().map(AssistantView::from))
        }
        async fn find_base(&self, _id: i64) -> Result<Option<Assistant>, ApiError> {
            Ok(self.base.clone())
        }
        async fn create(&self, new: &NewAssistant) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(2)
        }
        async fn update(&self, _id: i64, changes: &AssistantChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.base.is_some())
        }
        async fn doctors(
            &self,
            _assistant_id: i64,
            page: PageRequest,
        ) -> Result<Page<DoctorView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn attached_doctors(&self, _assistant_id: i64) -> Result<Vec<Doctor>, ApiError> {
            Ok(self.doctors.clone())
        }
        async fn attach(&self, assistant_id: i64, doctor_id: i64) -> Result<bool, ApiError> {
            *self.attached.lock().unwrap() = Some((assistant_id, doctor_id));
            Ok(self.attach_inserts)
        }
        async fn detach(&self, assistant_id: i64, doctor_id: i64) -> Result<bool, ApiError> {
            *self.detached.lock().unwrap() = Some((assistant_id, doctor_id));
            Ok(true)
        }
    }

    fn repo_with_assistant() -> MockAssistantRepo {
        MockAssistantRepo {
            base: Some(assistant(2)),
            doctors: vec![doctor(9)],
            attach_inserts: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn should_create_assistant_with_valid_references() {
        let usecase = CreateAssistantUseCase {
            repo: repo_with_assistant(),
            refs: StubRefs::default(),
        };
        let view = usecase
            .execute(CreateAssistantInput {
                user_id: Some(6),
                cabinet_id: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(view.assistant.id, 2);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!((stored.user_id, stored.cabinet_id), (6, 1));
    }

    #[tokio::test]
    async fn should_reject_dangling_cabinet_reference() {
        let usecase = CreateAssistantUseCase {
            repo: repo_with_assistant(),
            refs: StubRefs {
                cabinets: false,
                ..Default::default()
            },
        };
        let Err(ApiError::Validation(fields)) = usecase
            .execute(CreateAssistantInput {
                user_id: Some(6),
                cabinet_id: Some(99),
            })
            .await
        else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["cabinet_id"],
            vec!["The selected cabinet id is invalid."]
        );
    }

    #[tokio::test]
    async fn should_attach_doctor_and_return_the_doctor_list() {
        let usecase = AttachDoctorUseCase {
            repo: repo_with_assistant(),
            refs: StubRefs::default(),
        };
        let view = usecase
            .execute(2, AttachDoctorInput { doctor_id: Some(9) })
            .await
            .unwrap();
        assert_eq!(*usecase.repo.attached.lock().unwrap(), Some((2, 9)));
        assert_eq!(view.doctors.as_ref().map(Vec::len), Some(1));
        assert!(view.user.is_none());
        assert!(view.cabinet.is_none());
    }

    #[tokio::test]
    async fn should_treat_repeated_attach_as_a_noop() {
        let mut repo = repo_with_assistant();
        repo.attach_inserts = false;
        let usecase = AttachDoctorUseCase {
            repo,
            refs: StubRefs::default(),
        };
        let result = usecase
            .execute(2, AttachDoctorInput { doctor_id: Some(9) })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_validate_doctor_reference_on_attach() {
        let usecase = AttachDoctorUseCase {
            repo: repo_with_assistant(),
            refs: StubRefs {
                doctors: false,
                ..Default::default()
            },
        };
        let Err(ApiError::Validation(fields)) = usecase
            .execute(2, AttachDoctorInput { doctor_id: Some(99) })
            .await
        else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["doctor_id"],
            vec!["The selected doctor id is invalid."]
        );
    }

    #[tokio::test]
    async fn should_return_not_found_for_missing_assistant_on_attach() {
        let usecase = AttachDoctorUseCase {
            repo: MockAssistantRepo::default(),
            refs: StubRefs::default(),
        };
        let result = usecase
            .execute(2, AttachDoctorInput { doctor_id: Some(9) })
            .await;
        assert!(matches!(result, Err(ApiError::NotFound("Assistant"))));
    }

    #[tokio::test]
    async fn should_detach_doctor_from_assistant() {
        let usecase = DetachDoctorUseCase {
            repo: repo_with_assistant(),
            refs: StubRefs::default(),
        };
        usecase
            .execute(2, AttachDoctorInput { doctor_id: Some(9) })
            .await
            .unwrap();
        assert_eq!(*usecase.repo.detached.lock().unwrap(), Some((2, 9)));
    }

    #[tokio::test]
    async fn should_patch_cabinet_reference() {
        let usecase = UpdateAssistantUseCase {
            repo: repo_with_assistant(),
            refs: StubRefs::default(),
        };
        usecase
            .execute(2, UpdateAssistantInput { cabinet_id: Some(3) })
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.cabinet_id, Some(3));
    }

    #[tokio::test]
    async fn should_check_assistant_before_listing_doctors() {
        let missing = GetAssistantDoctorsUseCase {
            repo: MockAssistantRepo::default(),
        };
        let result = missing.execute(2, PageRequest::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound("Assistant"))));
    }
}
