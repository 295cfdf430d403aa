use serde_json::Value;

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{ConsultationRepository, RefLookupPort};
use crate::domain::types::{ConsultationChanges, ConsultationView, NewConsultation};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::present_owned;

// ── ListConsultations ────────────────────────────────────────────────────────

pub struct ListConsultationsUseCase<R: ConsultationRepository> {
    pub repo: R,
}

impl<R: ConsultationRepository> ListConsultationsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<ConsultationView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetConsultation ──────────────────────────────────────────────────────────

pub struct GetConsultationUseCase<R: ConsultationRepository> {
    pub repo: R,
}

impl<R: ConsultationRepository> GetConsultationUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<ConsultationView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Consultation"))
    }
}

// ── CreateConsultation ───────────────────────────────────────────────────────

pub struct CreateConsultationInput {
    pub appointment_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub notes: Option<String>,
    pub prescriptions: Option<Value>,
    pub attachments: Option<Value>,
}

/// One consultation per appointment. The validation check covers the common
/// case; the unique index behind [`ConsultationRepository::create`] settles
/// concurrent submissions.
pub struct CreateConsultationUseCase<R: ConsultationRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: ConsultationRepository, L: RefLookupPort> CreateConsultationUseCase<R, L> {
    pub async fn execute(
        &self,
        input: CreateConsultationInput,
    ) -> Result<ConsultationView, ApiError> {
        let mut errors = ValidationErrors::new();

        let appointment_id = match input.appointment_id {
            None => {
                errors.required("appointment_id");
                None
            }
            Some(v) => {
                if !self.refs.appointment_exists(v).await? {
                    errors.invalid_choice("appointment_id");
                    None
                } else if self.repo.appointment_consulted(v).await? {
                    errors.taken("appointment_id");
                    None
                } else {
                    Some(v)
                }
            }
        };
        let doctor_id = match input.doctor_id {
            None => {
                errors.required("doctor_id");
                None
            }
            Some(v) => {
                if self.refs.doctor_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("doctor_id");
                    None
                }
            }
        };
        let patient_id = match input.patient_id {
            None => {
                errors.required("patient_id");
                None
            }
            Some(v) => {
                if self.refs.patient_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("patient_id");
                    None
                }
            }
        };

        errors.into_result()?;
        let (Some(appointment_id), Some(doctor_id), Some(patient_id)) =
            (appointment_id, doctor_id, patient_id)
        else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "consultation validation passed with required fields missing"
            )));
        };

        let new = NewConsultation {
            appointment_id,
            doctor_id,
            patient_id,
            notes: present_owned(input.notes),
            prescriptions: input.prescriptions.filter(|v| !v.is_null()),
            attachments: input.attachments.filter(|v| !v.is_null()),
        };
        let id = self.repo.create(&new).await?;
        self.repo.find_by_id(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!(
                "consultation {id} missing right after insert"
            ))
        })
    }
}

// ── UpdateConsultation ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateConsultationInput {
    pub notes: Option<Option<String>>,
    pub prescriptions: Option<Option<Value>>,
    pub attachments: Option<Option<Value>>,
}

pub struct UpdateConsultationUseCase<R: ConsultationRepository> {
    pub repo: R,
}

impl<R: ConsultationRepository> UpdateConsultationUseCase<R> {
    pub async fn execute(
        &self,
        id: i64,
        input: UpdateConsultationInput,
    ) -> Result<ConsultationView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("Consultation"));
        }

        let changes = ConsultationChanges {
            notes: input.notes.map(present_owned),
            prescriptions: input
                .prescriptions
                .map(|inner| inner.filter(|v| !v.is_null())),
            attachments: input
                .attachments
                .map(|inner| inner.filter(|v| !v.is_null())),
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Consultation"))
    }
}

// ── DeleteConsultation ───────────────────────────────────────────────────────

pub struct DeleteConsultationUseCase<R: ConsultationRepository> {
    pub repo: R,
}

impl<R: ConsultationRepository> DeleteConsultationUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Consultation"))
        }
    }
}

// ── Lookups ──────────────────────────────────────────────────────────────────

pub struct GetConsultationsByPatientUseCase<R: ConsultationRepository> {
    pub repo: R,
}

impl<R: ConsultationRepository> GetConsultationsByPatientUseCase<R> {
    pub async fn execute(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError> {
        self.repo.list_by_patient(patient_id, page).await
    }
}

pub struct GetConsultationsByDoctorUseCase<R: ConsultationRepository> {
    pub repo: R,
}

impl<R: ConsultationRepository> GetConsultationsByDoctorUseCase<R> {
    pub async fn execute(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError> {
        self.repo.list_by_doctor(doctor_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::usecase::testutil::{StubRefs, consultation, empty_page};

    #[derive(Default)]
    struct MockConsultationRepo {
        consultation: Option<ConsultationView>,
        already_consulted: bool,
        created: Mutex<Option<NewConsultation>>,
        updated: Mutex<Option<ConsultationChanges>>,
    }

    impl ConsultationRepository for MockConsultationRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<ConsultationView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_expanded(
            &self,
            page: PageRequest,
        ) -> Result<Page<ConsultationView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<ConsultationView>, ApiError> {
            Ok(self.consultation.clone())
        }
        async fn exists(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.consultation.is_some())
        }
        async fn appointment_consulted(&self, _appointment_id: i64) -> Result<bool, ApiError> {
            Ok(self.already_consulted)
        }
        async fn create(&self, new: &NewConsultation) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(6)
        }
        async fn update(&self, _id: i64, changes: &ConsultationChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.consultation.is_some())
        }
        async fn list_by_patient(
            &self,
            _patient_id: i64,
            page: PageRequest,
        ) -> Result<Page<ConsultationView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_by_doctor(
            &self,
            _doctor_id: i64,
            page: PageRequest,
        ) -> Result<Page<ConsultationView>, ApiError> {
            Ok(empty_page(page))
        }
    }

    fn repo_with_consultation() -> MockConsultationRepo {
        MockConsultationRepo {
            consultation: Some(ConsultationView::from(consultation(6))),
            ..Default::default()
        }
    }

    fn create_input() -> CreateConsultationInput {
        CreateConsultationInput {
            appointment_id: Some(3),
            doctor_id: Some(9),
            patient_id: Some(4),
            notes: Some("Tension stable, ECG normal.".into()),
            prescriptions: None,
            attachments: None,
        }
    }

    #[tokio::test]
    async fn should_create_consultation_for_unconsulted_appointment() {
        let usecase = CreateConsultationUseCase {
            repo: repo_with_consultation(),
            refs: StubRefs::default(),
        };
        let view = usecase.execute(create_input()).await.unwrap();
        assert_eq!(view.consultation.id, 6);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.appointment_id, 3);
        assert_eq!(stored.notes.as_deref(), Some("Tension stable, ECG normal."));
    }

    #[tokio::test]
    async fn should_reject_second_consultation_for_same_appointment() {
        let usecase = CreateConsultationUseCase {
            repo: MockConsultationRepo {
                already_consulted: true,
                ..repo_with_consultation()
            },
            refs: StubRefs::default(),
        };
        let Err(ApiError::Validation(fields)) = usecase.execute(create_input()).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["appointment_id"],
            vec!["The appointment id has already been taken."]
        );
    }

    #[tokio::test]
    async fn should_prefer_dangling_reference_over_uniqueness() {
        let usecase = CreateConsultationUseCase {
            repo: MockConsultationRepo {
                already_consulted: true,
                ..repo_with_consultation()
            },
            refs: StubRefs {
                appointments: false,
                ..Default::default()
            },
        };
        let Err(ApiError::Validation(fields)) = usecase.execute(create_input()).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["appointment_id"],
            vec!["The selected appointment id is invalid."]
        );
    }

    #[tokio::test]
    async fn should_drop_null_attachment_payloads() {
        let usecase = CreateConsultationUseCase {
            repo: repo_with_consultation(),
            refs: StubRefs::default(),
        };
        let mut input = create_input();
        input.prescriptions = Some(json!(null));
        input.attachments = Some(json!([{"name": "ecg.pdf"}]));
        usecase.execute(input).await.unwrap();

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.prescriptions, None);
        assert_eq!(stored.attachments, Some(json!([{"name": "ecg.pdf"}])));
    }

    #[tokio::test]
    async fn should_clear_notes_on_explicit_null() {
        let usecase = UpdateConsultationUseCase {
            repo: repo_with_consultation(),
        };
        usecase
            .execute(
                6,
                UpdateConsultationInput {
                    notes: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.notes, Some(None));
        assert_eq!(changes.prescriptions, None);
    }

    #[tokio::test]
    async fn should_return_not_found_for_missing_consultation() {
        let usecase = GetConsultationUseCase {
            repo: MockConsultationRepo::default(),
        };
        let result = usecase.execute(6).await;
        assert!(matches!(result, Err(ApiError::NotFound("Consultation"))));
    }
}
