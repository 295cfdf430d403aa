use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{DoctorRepository, RefLookupPort};
use crate::domain::types::{
    AppointmentView, AssistantView, ConsultationView, DoctorChanges, DoctorSearchFilter,
    DoctorView, NewDoctor, PatientView, parse_date,
};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::{present, present_owned};

// ── ListDoctors ──────────────────────────────────────────────────────────────

pub struct ListDoctorsUseCase<R: DoctorRepository> {
    pub repo: R,
}

impl<R: DoctorRepository> ListDoctorsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<DoctorView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetDoctor ────────────────────────────────────────────────────────────────

pub struct GetDoctorUseCase<R: DoctorRepository> {
    pub repo: R,
}

impl<R: DoctorRepository> GetDoctorUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<DoctorView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Doctor"))
    }
}

// ── SearchDoctors ────────────────────────────────────────────────────────────

/// Public directory search. The filter is already typed; an empty filter
/// lists every doctor.
pub struct SearchDoctorsUseCase<R: DoctorRepository> {
    pub repo: R,
}

impl<R: DoctorRepository> SearchDoctorsUseCase<R> {
    pub async fn execute(
        &self,
        filter: DoctorSearchFilter,
        page: PageRequest,
    ) -> Result<Page<DoctorView>, ApiError> {
        self.repo.search(&filter, page).await
    }
}

// ── CreateDoctor ─────────────────────────────────────────────────────────────

pub struct CreateDoctorInput {
    pub user_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub speciality: Option<String>,
    pub career_start: Option<String>,
    pub consultation_price: Option<f64>,
    pub consultation_duration: Option<i32>,
}

pub struct CreateDoctorUseCase<R: DoctorRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: DoctorRepository, L: RefLookupPort> CreateDoctorUseCase<R, L> {
    pub async fn execute(&self, input: CreateDoctorInput) -> Result<DoctorView, ApiError> {
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

        let speciality = present(input.speciality.as_deref());
        if speciality.is_none() {
            errors.required("speciality");
        }

        let career_start = match present(input.career_start.as_deref()) {
            None => {
                errors.required("career_start");
                None
            }
            Some(v) => match parse_date(v) {
                Some(d) => Some(d),
                None => {
                    errors.must_be_date("career_start");
                    None
                }
            },
        };

        let consultation_price = match input.consultation_price {
            None => {
                errors.required("consultation_price");
                None
            }
            Some(v) if v < 0.0 => {
                errors.min_value("consultation_price", 0);
                None
            }
            Some(v) => Some(v),
        };

        let consultation_duration = match input.consultation_duration {
            None => {
                errors.required("consultation_duration");
                None
            }
            Some(v) if v < 5 => {
                errors.min_value("consultation_duration", 5);
                None
            }
            Some(v) => Some(v),
        };

        errors.into_result()?;
        let (
            Some(user_id),
            Some(cabinet_id),
            Some(speciality),
            Some(career_start),
            Some(consultation_price),
            Some(consultation_duration),
        ) = (
            user_id,
            cabinet_id,
            speciality,
            career_start,
            consultation_price,
            consultation_duration,
        )
        else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "doctor validation passed with required fields missing"
            )));
        };

        let new = NewDoctor {
            user_id,
            cabinet_id,
            speciality: speciality.to_owned(),
            career_start,
            consultation_price,
            consultation_duration,
        };
        let id = self.repo.create(&new).await?;
        self.repo.find_summary(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("doctor {id} missing right after insert"))
        })
    }
}

// ── UpdateDoctor ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateDoctorInput {
    pub cabinet_id: Option<i64>,
    pub speciality: Option<String>,
    pub career_start: Option<String>,
    pub consultation_price: Option<f64>,
    pub consultation_duration: Option<i32>,
}

pub struct UpdateDoctorUseCase<R: DoctorRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: DoctorRepository, L: RefLookupPort> UpdateDoctorUseCase<R, L> {
    pub async fn execute(&self, id: i64, input: UpdateDoctorInput) -> Result<DoctorView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("Doctor"));
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

        let career_start = match present(input.career_start.as_deref()) {
            None => None,
            Some(v) => match parse_date(v) {
                Some(d) => Some(d),
                None => {
                    errors.must_be_date("career_start");
                    None
                }
            },
        };

        let consultation_price = match input.consultation_price {
            Some(v) if v < 0.0 => {
                errors.min_value("consultation_price", 0);
                None
            }
            other => other,
        };

        let consultation_duration = match input.consultation_duration {
            Some(v) if v < 5 => {
                errors.min_value("consultation_duration", 5);
                None
            }
            other => other,
        };

        errors.into_result()?;

        let changes = DoctorChanges {
            cabinet_id,
            speciality: present_owned(input.speciality),
            career_start,
            consultation_price,
            consultation_duration,
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_summary(id)
            .await?
            .ok_or(ApiError::NotFound("Doctor"))
    }
}

// ── DeleteDoctor ─────────────────────────────────────────────────────────────

pub struct DeleteDoctorUseCase<R: DoctorRepository> {
    pub repo: R,
}

impl<R: DoctorRepository> DeleteDoctorUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Doctor"))
        }
    }
}

// ── Scoped listings ──────────────────────────────────────────────────────────

pub struct GetDoctorAppointmentsUseCase<R: DoctorRepository> {
    pub repo: R,
}

impl<R: DoctorRepository> GetDoctorAppointmentsUseCase<R> {
    pub async fn execute(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        if !self.repo.exists(doctor_id).await? {
            return Err(ApiError::NotFound("Doctor"));
        }
        self.repo.appointments(doctor_id, page).await
    }
}

pub struct GetDoctorConsultationsUseCase<R: DoctorRepository> {
    pub repo: R,
}

impl<R: DoctorRepository> GetDoctorConsultationsUseCase<R> {
    pub async fn execute(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError> {
        if !self.repo.exists(doctor_id).await? {
            return Err(ApiError::NotFound("Doctor"));
        }
        self.repo.consultations(doctor_id, page).await
    }
}

pub struct GetDoctorAssistantsUseCase<R: DoctorRepository> {
    pub repo: R,
}

impl<R: DoctorRepository> GetDoctorAssistantsUseCase<R> {
    pub async fn execute(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<AssistantView>, ApiError> {
        if !self.repo.exists(doctor_id).await? {
            return Err(ApiError::NotFound("Doctor"));
        }
        self.repo.assistants(doctor_id, page).await
    }
}

pub struct GetDoctorPatientsUseCase<R: DoctorRepository> {
    pub repo: R,
}

impl<R: DoctorRepository> GetDoctorPatientsUseCase<R> {
    pub async fn execute(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<PatientView>, ApiError> {
        if !self.repo.exists(doctor_id).await? {
            return Err(ApiError::NotFound("Doctor"));
        }
        self.repo.patients(doctor_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::usecase::testutil::{StubRefs, doctor, empty_page};

    #[derive(Default)]
    struct MockDoctorRepo {
        doctor: Option<DoctorView>,
        created: Mutex<Option<NewDoctor>>,
        updated: Mutex<Option<DoctorChanges>>,
    }

    impl DoctorRepository for MockDoctorRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<DoctorView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_summaries(&self, page: PageRequest) -> Result<Page<DoctorView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<DoctorView>, ApiError> {
            Ok(self.doctor.clone())
        }
        async fn find_summary(&self, _id: i64) -> Result<Option<DoctorView>, ApiError> {
            Ok(self.doctor.clone())
        }
        async fn exists(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.doctor.is_some())
        }
        async fn search(
            &self,
            _filter: &DoctorSearchFilter,
            page: PageRequest,
        ) -> Result<Page<DoctorView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn create(&self, new: &NewDoctor) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(9)
        }
        async fn update(&self, _id: i64, changes: &DoctorChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.doctor.is_some())
        }
        async fn appointments(
            &self,
            _doctor_id: i64,
            page: PageRequest,
        ) -> Result<Page<AppointmentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn consultations(
            &self,
            _doctor_id: i64,
            page: PageRequest,
        ) -> Result<Page<ConsultationView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn assistants(
            &self,
            _doctor_id: i64,
            page: PageRequest,
        ) -> Result<Page<AssistantView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn patients(
            &self,
            _doctor_id: i64,
            page: PageRequest,
        ) -> Result<Page<PatientView>, ApiError> {
            Ok(empty_page(page))
        }
    }

    fn repo_with_doctor() -> MockDoctorRepo {
        MockDoctorRepo {
            doctor: Some(DoctorView::from(doctor(9))),
            ..Default::default()
        }
    }

    fn create_input() -> CreateDoctorInput {
        CreateDoctorInput {
            user_id: Some(3),
            cabinet_id: Some(1),
            speciality: Some("cardiology".into()),
            career_start: Some("2015-09-01".into()),
            consultation_price: Some(2500.0),
            consultation_duration: Some(30),
        }
    }

    #[tokio::test]
    async fn should_create_doctor_with_valid_references() {
        let usecase = CreateDoctorUseCase {
            repo: repo_with_doctor(),
            refs: StubRefs::default(),
        };
        let view = usecase.execute(create_input()).await.unwrap();
        assert_eq!(view.doctor.id, 9);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.user_id, 3);
        assert_eq!(stored.consultation_duration, 30);
    }

    #[tokio::test]
    async fn should_reject_create_when_user_reference_is_missing() {
        let usecase = CreateDoctorUseCase {
            repo: repo_with_doctor(),
            refs: StubRefs {
                users: false,
                ..Default::default()
            },
        };
        let Err(ApiError::Validation(fields)) = usecase.execute(create_input()).await else {
            panic!("expected validation failure");
        };
        assert_eq!(fields["user_id"], vec!["The selected user id is invalid."]);
    }

    #[tokio::test]
    async fn should_require_minimum_consultation_duration() {
        let usecase = CreateDoctorUseCase {
            repo: repo_with_doctor(),
            refs: StubRefs::default(),
        };
        let mut input = create_input();
        input.consultation_duration = Some(3);
        input.consultation_price = Some(-1.0);
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["consultation_duration"],
            vec!["The consultation duration field must be at least 5."]
        );
        assert_eq!(
            fields["consultation_price"],
            vec!["The consultation price field must be at least 0."]
        );
    }

    #[tokio::test]
    async fn should_return_not_found_before_validating_a_patch() {
        let usecase = UpdateDoctorUseCase {
            repo: MockDoctorRepo::default(),
            refs: StubRefs::default(),
        };
        let result = usecase.execute(9, UpdateDoctorInput::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound("Doctor"))));
    }

    #[tokio::test]
    async fn should_patch_only_supplied_fields() {
        let usecase = UpdateDoctorUseCase {
            repo: repo_with_doctor(),
            refs: StubRefs::default(),
        };
        usecase
            .execute(
                9,
                UpdateDoctorInput {
                    speciality: Some("dermatology".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.speciality.as_deref(), Some("dermatology"));
        assert_eq!(changes.cabinet_id, None);
        assert_eq!(changes.consultation_price, None);
    }

    #[tokio::test]
    async fn should_check_doctor_before_listing_relationships() {
        let missing = GetDoctorAppointmentsUseCase {
            repo: MockDoctorRepo::default(),
        };
        let result = missing.execute(9, PageRequest::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound("Doctor"))));

        let found = GetDoctorPatientsUseCase {
            repo: repo_with_doctor(),
        };
        let page = found.execute(9, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }
}
