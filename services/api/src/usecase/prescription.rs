use chrono::NaiveDate;
use serde_json::Value;

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{PrescriptionRepository, RefLookupPort};
use crate::domain::types::{
    NewPrescription, PrescriptionChanges, PrescriptionStatus, PrescriptionView, parse_date,
    parse_datetime,
};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::{present, present_owned};

fn refills_in_range(errors: &mut ValidationErrors, field: &str, value: Option<i32>) -> Option<i32> {
    match value {
        Some(v) if v < 0 => {
            errors.min_value(field, 0);
            None
        }
        other => other,
    }
}

fn check_refill_bound(errors: &mut ValidationErrors, allowed: i32, used: i32) {
    if used > allowed {
        errors.add(
            "refills_used",
            "The refills used field must be less than or equal to refills allowed.",
        );
    }
}

// ── ListPrescriptions ────────────────────────────────────────────────────────

pub struct ListPrescriptionsUseCase<R: PrescriptionRepository> {
    pub repo: R,
}

impl<R: PrescriptionRepository> ListPrescriptionsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<PrescriptionView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetPrescription ──────────────────────────────────────────────────────────

pub struct GetPrescriptionUseCase<R: PrescriptionRepository> {
    pub repo: R,
}

impl<R: PrescriptionRepository> GetPrescriptionUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<PrescriptionView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Prescription"))
    }
}

// ── CreatePrescription ───────────────────────────────────────────────────────

pub struct CreatePrescriptionInput {
    pub consultation_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub prescription_date: Option<String>,
    pub status: Option<String>,
    pub medications: Option<Value>,
    pub general_instructions: Option<String>,
    pub valid_until: Option<String>,
    pub refills_allowed: Option<i32>,
    pub refills_used: Option<i32>,
}

pub struct CreatePrescriptionUseCase<R: PrescriptionRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: PrescriptionRepository, L: RefLookupPort> CreatePrescriptionUseCase<R, L> {
    pub async fn execute(
        &self,
        input: CreatePrescriptionInput,
    ) -> Result<PrescriptionView, ApiError> {
        let mut errors = ValidationErrors::new();

        let consultation_id = match input.consultation_id {
            None => {
                errors.required("consultation_id");
                None
            }
            Some(v) => {
                if self.refs.consultation_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("consultation_id");
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

        let prescription_date = match present(input.prescription_date.as_deref()) {
            None => {
                errors.required("prescription_date");
                None
            }
            Some(v) => match parse_datetime(v) {
                Some(dt) => Some(dt),
                None => {
                    errors.must_be_date("prescription_date");
                    None
                }
            },
        };

        let status = match present(input.status.as_deref()) {
            None => {
                errors.required("status");
                None
            }
            Some(v) => match PrescriptionStatus::parse(v) {
                Some(s) => Some(s),
                None => {
                    errors.invalid_choice("status");
                    None
                }
            },
        };

        let valid_until: Option<NaiveDate> = match present(input.valid_until.as_deref()) {
            None => None,
            Some(v) => match parse_date(v) {
                Some(d) => Some(d),
                None => {
                    errors.must_be_date("valid_until");
                    None
                }
            },
        };

        let refills_allowed = refills_in_range(&mut errors, "refills_allowed", input.refills_allowed)
            .unwrap_or(0);
        let refills_used =
            refills_in_range(&mut errors, "refills_used", input.refills_used).unwrap_or(0);
        check_refill_bound(&mut errors, refills_allowed, refills_used);

        errors.into_result()?;
        let (Some(consultation_id), Some(patient_id), Some(doctor_id), Some(date), Some(status)) = (
            consultation_id,
            patient_id,
            doctor_id,
            prescription_date,
            status,
        ) else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "prescription validation passed with required fields missing"
            )));
        };

        let new = NewPrescription {
            consultation_id,
            patient_id,
            doctor_id,
            prescription_date: date,
            status,
            medications: input.medications.filter(|v| !v.is_null()),
            general_instructions: present_owned(input.general_instructions),
            valid_until,
            refills_allowed,
            refills_used,
        };
        let id = self.repo.create(&new).await?;
        self.repo.find_by_id(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!(
                "prescription {id} missing right after insert"
            ))
        })
    }
}

// ── UpdatePrescription ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdatePrescriptionInput {
    pub status: Option<String>,
    pub medications: Option<Option<Value>>,
    pub general_instructions: Option<Option<String>>,
    pub valid_until: Option<Option<String>>,
    pub refills_allowed: Option<i32>,
    pub refills_used: Option<i32>,
}

/// The refill bound is checked against effective values: each side takes the
/// patched number when present, the stored one otherwise.
pub struct UpdatePrescriptionUseCase<R: PrescriptionRepository> {
    pub repo: R,
}

impl<R: PrescriptionRepository> UpdatePrescriptionUseCase<R> {
    pub async fn execute(
        &self,
        id: i64,
        input: UpdatePrescriptionInput,
    ) -> Result<PrescriptionView, ApiError> {
        let Some(stored) = self.repo.find_base(id).await? else {
            return Err(ApiError::NotFound("Prescription"));
        };

        let mut errors = ValidationErrors::new();

        let status = match present(input.status.as_deref()) {
            None => None,
            Some(v) => match PrescriptionStatus::parse(v) {
                Some(s) => Some(s),
                None => {
                    errors.invalid_choice("status");
                    None
                }
            },
        };

        let valid_until: Option<Option<NaiveDate>> = match input
            .valid_until
            .map(present_owned)
        {
            None => None,
            Some(None) => Some(None),
            Some(Some(v)) => match parse_date(&v) {
                Some(d) => Some(Some(d)),
                None => {
                    errors.must_be_date("valid_until");
                    None
                }
            },
        };

        let refills_allowed = refills_in_range(&mut errors, "refills_allowed", input.refills_allowed);
        let refills_used = refills_in_range(&mut errors, "refills_used", input.refills_used);
        check_refill_bound(
            &mut errors,
            refills_allowed.unwrap_or(stored.refills_allowed),
            refills_used.unwrap_or(stored.refills_used),
        );

        errors.into_result()?;

        let changes = PrescriptionChanges {
            status,
            medications: input
                .medications
                .map(|inner| inner.filter(|v| !v.is_null())),
            general_instructions: input.general_instructions.map(present_owned),
            valid_until,
            refills_allowed,
            refills_used,
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Prescription"))
    }
}

// ── DeletePrescription ───────────────────────────────────────────────────────

pub struct DeletePrescriptionUseCase<R: PrescriptionRepository> {
    pub repo: R,
}

impl<R: PrescriptionRepository> DeletePrescriptionUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Prescription"))
        }
    }
}

// ── Lookups ──────────────────────────────────────────────────────────────────

pub struct GetPrescriptionsByPatientUseCase<R: PrescriptionRepository> {
    pub repo: R,
}

impl<R: PrescriptionRepository> GetPrescriptionsByPatientUseCase<R> {
    pub async fn execute(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<PrescriptionView>, ApiError> {
        self.repo.list_by_patient(patient_id, page).await
    }
}

pub struct GetPrescriptionsByDoctorUseCase<R: PrescriptionRepository> {
    pub repo: R,
}

impl<R: PrescriptionRepository> GetPrescriptionsByDoctorUseCase<R> {
    pub async fn execute(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<PrescriptionView>, ApiError> {
        self.repo.list_by_doctor(doctor_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::types::Prescription;
    use crate::usecase::testutil::{StubRefs, empty_page, prescription};

    #[derive(Default)]
    struct MockPrescriptionRepo {
        prescription: Option<Prescription>,
        created: Mutex<Option<NewPrescription>>,
        updated: Mutex<Option<PrescriptionChanges>>,
    }

    impl PrescriptionRepository for MockPrescriptionRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<PrescriptionView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<PrescriptionView>, ApiError> {
            Ok(self.prescription.clone().map(PrescriptionView::from))
        }
        async fn find_base(&self, _id: i64) -> Result<Option<Prescription>, ApiError> {
            Ok(self.prescription.clone())
        }
        async fn create(&self, new: &NewPrescription) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(8)
        }
        async fn update(&self, _id: i64, changes: &PrescriptionChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.prescription.is_some())
        }
        async fn list_by_patient(
            &self,
            _patient_id: i64,
            page: PageRequest,
        ) -> Result<Page<PrescriptionView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_by_doctor(
            &self,
            _doctor_id: i64,
            page: PageRequest,
        ) -> Result<Page<PrescriptionView>, ApiError> {
            Ok(empty_page(page))
        }
    }

    fn repo_with_prescription() -> MockPrescriptionRepo {
        MockPrescriptionRepo {
            prescription: Some(prescription(8)),
            ..Default::default()
        }
    }

    fn create_input() -> CreatePrescriptionInput {
        CreatePrescriptionInput {
            consultation_id: Some(6),
            patient_id: Some(4),
            doctor_id: Some(9),
            prescription_date: Some("2025-11-22".into()),
            status: Some("ACTIVE".into()),
            medications: None,
            general_instructions: Some("Un comprimé matin et soir.".into()),
            valid_until: Some("2026-02-22".into()),
            refills_allowed: Some(2),
            refills_used: None,
        }
    }

    #[tokio::test]
    async fn should_create_prescription_with_refill_defaults() {
        let usecase = CreatePrescriptionUseCase {
            repo: repo_with_prescription(),
            refs: StubRefs::default(),
        };
        let view = usecase.execute(create_input()).await.unwrap();
        assert_eq!(view.prescription.id, 8);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.refills_allowed, 2);
        assert_eq!(stored.refills_used, 0);
        assert_eq!(
            stored.valid_until,
            NaiveDate::from_ymd_opt(2026, 2, 22),
        );
    }

    #[tokio::test]
    async fn should_reject_refills_used_above_allowed() {
        let usecase = CreatePrescriptionUseCase {
            repo: repo_with_prescription(),
            refs: StubRefs::default(),
        };
        let mut input = create_input();
        input.refills_allowed = Some(1);
        input.refills_used = Some(3);
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["refills_used"],
            vec!["The refills used field must be less than or equal to refills allowed."]
        );
    }

    #[tokio::test]
    async fn should_reject_negative_refill_counts() {
        let usecase = CreatePrescriptionUseCase {
            repo: repo_with_prescription(),
            refs: StubRefs::default(),
        };
        let mut input = create_input();
        input.refills_allowed = Some(-1);
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["refills_allowed"],
            vec!["The refills allowed field must be at least 0."]
        );
    }

    #[tokio::test]
    async fn should_check_patched_refills_against_stored_values() {
        // Stored row allows 2 refills; patching only refills_used to 3 must
        // trip the bound even though refills_allowed is untouched.
        let usecase = UpdatePrescriptionUseCase {
            repo: repo_with_prescription(),
        };
        let result = usecase
            .execute(
                8,
                UpdatePrescriptionInput {
                    refills_used: Some(3),
                    ..Default::default()
                },
            )
            .await;
        let Err(ApiError::Validation(fields)) = result else {
            panic!("expected validation failure");
        };
        assert!(fields.contains_key("refills_used"));
    }

    #[tokio::test]
    async fn should_accept_patched_refills_within_stored_bound() {
        let usecase = UpdatePrescriptionUseCase {
            repo: repo_with_prescription(),
        };
        usecase
            .execute(
                8,
                UpdatePrescriptionInput {
                    status: Some("COMPLETED".into()),
                    refills_used: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.status, Some(PrescriptionStatus::Completed));
        assert_eq!(changes.refills_used, Some(2));
        assert_eq!(changes.refills_allowed, None);
    }

    #[tokio::test]
    async fn should_reject_dangling_consultation() {
        let usecase = CreatePrescriptionUseCase {
            repo: repo_with_prescription(),
            refs: StubRefs {
                consultations: false,
                ..Default::default()
            },
        };
        let Err(ApiError::Validation(fields)) = usecase.execute(create_input()).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["consultation_id"],
            vec!["The selected consultation id is invalid."]
        );
    }

    #[tokio::test]
    async fn should_return_not_found_before_validating_a_patch() {
        let usecase = UpdatePrescriptionUseCase {
            repo: MockPrescriptionRepo::default(),
        };
        let result = usecase
            .execute(8, UpdatePrescriptionInput::default())
            .await;
        assert!(matches!(result, Err(ApiError::NotFound("Prescription"))));
    }
}
