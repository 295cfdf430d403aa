use serde_json::Value;

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{PatientRepository, RefLookupPort};
use crate::domain::types::{
    AppointmentView, ConsultationView, NewPatient, PatientChanges, PatientView, PrescriptionView,
};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::{present, present_owned};

// ── ListPatients ─────────────────────────────────────────────────────────────

pub struct ListPatientsUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> ListPatientsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<PatientView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetPatient ───────────────────────────────────────────────────────────────

pub struct GetPatientUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> GetPatientUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<PatientView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Patient"))
    }
}

// ── CreatePatient ────────────────────────────────────────────────────────────

pub struct CreatePatientInput {
    pub user_id: Option<i64>,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<String>,
    pub weight: Option<f64>,
    pub medical_history: Option<Value>,
    pub allergies: Option<Value>,
}

pub struct CreatePatientUseCase<R: PatientRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: PatientRepository, L: RefLookupPort> CreatePatientUseCase<R, L> {
    pub async fn execute(&self, input: CreatePatientInput) -> Result<PatientView, ApiError> {
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

        let emergency_contact = present(input.emergency_contact.as_deref());
        if let Some(v) = emergency_contact {
            if v.chars().count() > 255 {
                errors.max_chars("emergency_contact", 255);
            }
        }

        let blood_type = present(input.blood_type.as_deref());
        if let Some(v) = blood_type {
            if v.chars().count() > 5 {
                errors.max_chars("blood_type", 5);
            }
        }

        if let Some(v) = input.weight {
            if v < 0.0 {
                errors.min_value("weight", 0);
            }
        }

        let medical_history = input.medical_history.filter(|v| !v.is_null());
        if let Some(v) = &medical_history {
            if !v.is_array() && !v.is_object() {
                errors.must_be_array("medical_history");
            }
        }
        let allergies = input.allergies.filter(|v| !v.is_null());
        if let Some(v) = &allergies {
            if !v.is_array() && !v.is_object() {
                errors.must_be_array("allergies");
            }
        }

        errors.into_result()?;
        let Some(user_id) = user_id else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "patient validation passed with required fields missing"
            )));
        };

        let new = NewPatient {
            user_id,
            emergency_contact: emergency_contact.map(str::to_owned),
            blood_type: blood_type.map(str::to_owned),
            weight: input.weight,
            medical_history,
            allergies,
        };
        let id = self.repo.create(&new).await?;
        self.repo.find_summary(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("patient {id} missing right after insert"))
        })
    }
}

// ── UpdatePatient ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdatePatientInput {
    pub emergency_contact: Option<Option<String>>,
    pub blood_type: Option<Option<String>>,
    pub weight: Option<Option<f64>>,
    pub medical_history: Option<Option<Value>>,
    pub allergies: Option<Option<Value>>,
}

pub struct UpdatePatientUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> UpdatePatientUseCase<R> {
    pub async fn execute(
        &self,
        id: i64,
        input: UpdatePatientInput,
    ) -> Result<PatientView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("Patient"));
        }

        let mut errors = ValidationErrors::new();

        let emergency_contact = input.emergency_contact.map(present_owned);
        if let Some(Some(v)) = &emergency_contact {
            if v.chars().count() > 255 {
                errors.max_chars("emergency_contact", 255);
            }
        }

        let blood_type = input.blood_type.map(present_owned);
        if let Some(Some(v)) = &blood_type {
            if v.chars().count() > 5 {
                errors.max_chars("blood_type", 5);
            }
        }

        if let Some(Some(v)) = input.weight {
            if v < 0.0 {
                errors.min_value("weight", 0);
            }
        }

        let medical_history = input
            .medical_history
            .map(|inner| inner.filter(|v| !v.is_null()));
        if let Some(Some(v)) = &medical_history {
            if !v.is_array() && !v.is_object() {
                errors.must_be_array("medical_history");
            }
        }
        let allergies = input.allergies.map(|inner| inner.filter(|v| !v.is_null()));
        if let Some(Some(v)) = &allergies {
            if !v.is_array() && !v.is_object() {
                errors.must_be_array("allergies");
            }
        }

        errors.into_result()?;

        let changes = PatientChanges {
            emergency_contact,
            blood_type,
            weight: input.weight,
            medical_history,
            allergies,
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_summary(id)
            .await?
            .ok_or(ApiError::NotFound("Patient"))
    }
}

// ── DeletePatient ────────────────────────────────────────────────────────────

pub struct DeletePatientUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> DeletePatientUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Patient"))
        }
    }
}

// ── Scoped listings ──────────────────────────────────────────────────────────

pub struct GetPatientAppointmentsUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> GetPatientAppointmentsUseCase<R> {
    pub async fn execute(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        if !self.repo.exists(patient_id).await? {
            return Err(ApiError::NotFound("Patient"));
        }
        self.repo.appointments(patient_id, page).await
    }
}

pub struct GetPatientConsultationsUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> GetPatientConsultationsUseCase<R> {
    pub async fn execute(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<ConsultationView>, ApiError> {
        if !self.repo.exists(patient_id).await? {
            return Err(ApiError::NotFound("Patient"));
        }
        self.repo.consultations(patient_id, page).await
    }
}

pub struct GetPatientPrescriptionsUseCase<R: PatientRepository> {
    pub repo: R,
}

impl<R: PatientRepository> GetPatientPrescriptionsUseCase<R> {
    pub async fn execute(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<PrescriptionView>, ApiError> {
        if !self.repo.exists(patient_id).await? {
            return Err(ApiError::NotFound("Patient"));
        }
        self.repo.prescriptions(patient_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::usecase::testutil::{StubRefs, empty_page, patient};

    #[derive(Default)]
    struct MockPatientRepo {
        patient: Option<PatientView>,
        created: Mutex<Option<NewPatient>>,
        updated: Mutex<Option<PatientChanges>>,
    }

    impl PatientRepository for MockPatientRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<PatientView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_summaries(&self, page: PageRequest) -> Result<Page<PatientView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<PatientView>, ApiError> {
            Ok(self.patient.clone())
        }
        async fn find_summary(&self, _id: i64) -> Result<Option<PatientView>, ApiError> {
            Ok(self.patient.clone())
        }
        async fn exists(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.patient.is_some())
        }
        async fn create(&self, new: &NewPatient) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(4)
        }
        async fn update(&self, _id: i64, changes: &PatientChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.patient.is_some())
        }
        async fn appointments(
            &self,
            _patient_id: i64,
            page: PageRequest,
        ) -> Result<Page<AppointmentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn consultations(
            &self,
            _patient_id: i64,
            page: PageRequest,
        ) -> Result<Page<ConsultationView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn prescriptions(
            &self,
            _patient_id: i64,
            page: PageRequest,
        ) -> Result<Page<PrescriptionView>, ApiError> {
            Ok(empty_page(page))
        }
    }

    fn repo_with_patient() -> MockPatientRepo {
        MockPatientRepo {
            patient: Some(PatientView::from(patient(4))),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn should_create_patient_with_only_a_user_reference() {
        let usecase = CreatePatientUseCase {
            repo: repo_with_patient(),
            refs: StubRefs::default(),
        };
        let view = usecase
            .execute(CreatePatientInput {
                user_id: Some(4),
                emergency_contact: None,
                blood_type: None,
                weight: None,
                medical_history: None,
                allergies: None,
            })
            .await
            .unwrap();
        assert_eq!(view.patient.id, 4);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.user_id, 4);
        assert_eq!(stored.blood_type, None);
    }

    #[tokio::test]
    async fn should_reject_dangling_user_reference() {
        let usecase = CreatePatientUseCase {
            repo: repo_with_patient(),
            refs: StubRefs {
                users: false,
                ..Default::default()
            },
        };
        let Err(ApiError::Validation(fields)) = usecase
            .execute(CreatePatientInput {
                user_id: Some(99),
                emergency_contact: None,
                blood_type: None,
                weight: None,
                medical_history: None,
                allergies: None,
            })
            .await
        else {
            panic!("expected validation failure");
        };
        assert_eq!(fields["user_id"], vec!["The selected user id is invalid."]);
    }

    #[tokio::test]
    async fn should_enforce_blood_type_length_and_weight_floor() {
        let usecase = CreatePatientUseCase {
            repo: repo_with_patient(),
            refs: StubRefs::default(),
        };
        let Err(ApiError::Validation(fields)) = usecase
            .execute(CreatePatientInput {
                user_id: Some(4),
                emergency_contact: None,
                blood_type: Some("AB+TOO".into()),
                weight: Some(-2.0),
                medical_history: None,
                allergies: None,
            })
            .await
        else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["blood_type"],
            vec!["The blood type field must not be greater than 5 characters."]
        );
        assert_eq!(fields["weight"], vec!["The weight field must be at least 0."]);
    }

    #[tokio::test]
    async fn should_require_arrays_for_history_fields() {
        let usecase = CreatePatientUseCase {
            repo: repo_with_patient(),
            refs: StubRefs::default(),
        };
        let Err(ApiError::Validation(fields)) = usecase
            .execute(CreatePatientInput {
                user_id: Some(4),
                emergency_contact: None,
                blood_type: None,
                weight: None,
                medical_history: Some(json!("asthma")),
                allergies: Some(json!(["pollen"])),
            })
            .await
        else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["medical_history"],
            vec!["The medical history field must be an array."]
        );
        assert!(!fields.contains_key("allergies"));
    }

    #[tokio::test]
    async fn should_return_not_found_before_validating_a_patch() {
        let usecase = UpdatePatientUseCase {
            repo: MockPatientRepo::default(),
        };
        let result = usecase.execute(4, UpdatePatientInput::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound("Patient"))));
    }

    #[tokio::test]
    async fn should_clear_fields_on_explicit_null() {
        let usecase = UpdatePatientUseCase {
            repo: repo_with_patient(),
        };
        usecase
            .execute(
                4,
                UpdatePatientInput {
                    medical_history: Some(None),
                    blood_type: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.medical_history, Some(None));
        assert_eq!(changes.blood_type, Some(None));
        assert_eq!(changes.weight, None);
    }

    #[tokio::test]
    async fn should_check_patient_before_listing_relationships() {
        let missing = GetPatientPrescriptionsUseCase {
            repo: MockPatientRepo::default(),
        };
        let result = missing.execute(4, PageRequest::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound("Patient"))));

        let found = GetPatientAppointmentsUseCase {
            repo: repo_with_patient(),
        };
        let page = found.execute(4, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }
}
