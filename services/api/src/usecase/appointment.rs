use chrono::{DateTime, Utc};

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{AppointmentRepository, RefLookupPort};
use crate::domain::types::{
    AppointmentChanges, AppointmentStatus, AppointmentView, NewAppointment, parse_datetime_exact,
};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::present;

const DATE_FORMAT: &str = "Y-m-d H:i:s";

// ── ListAppointments ─────────────────────────────────────────────────────────

pub struct ListAppointmentsUseCase<R: AppointmentRepository> {
    pub repo: R,
}

impl<R: AppointmentRepository> ListAppointmentsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<AppointmentView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetAppointment ───────────────────────────────────────────────────────────

pub struct GetAppointmentUseCase<R: AppointmentRepository> {
    pub repo: R,
}

impl<R: AppointmentRepository> GetAppointmentUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<AppointmentView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Appointment"))
    }
}

// ── CreateAppointment ────────────────────────────────────────────────────────

pub struct CreateAppointmentInput {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub created_by_assistant_id: Option<i64>,
}

pub struct CreateAppointmentUseCase<R: AppointmentRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: AppointmentRepository, L: RefLookupPort> CreateAppointmentUseCase<R, L> {
    pub async fn execute(&self, input: CreateAppointmentInput) -> Result<AppointmentView, ApiError> {
        let mut errors = ValidationErrors::new();

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

        let date = match present(input.date.as_deref()) {
            None => {
                errors.required("date");
                None
            }
            Some(v) => match parse_datetime_exact(v) {
                Some(dt) => Some(dt),
                None => {
                    errors.must_match_format("date", DATE_FORMAT);
                    None
                }
            },
        };

        let status = match present(input.status.as_deref()) {
            None => {
                errors.required("status");
                None
            }
            Some(v) => match AppointmentStatus::parse(v) {
                Some(s) => Some(s),
                None => {
                    errors.invalid_choice("status");
                    None
                }
            },
        };

        let created_by_assistant_id = match input.created_by_assistant_id {
            None => None,
            Some(v) => {
                if self.refs.assistant_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("created_by_assistant_id");
                    None
                }
            }
        };

        errors.into_result()?;
        let (Some(patient_id), Some(doctor_id), Some(cabinet_id), Some(date), Some(status)) =
            (patient_id, doctor_id, cabinet_id, date, status)
        else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "appointment validation passed with required fields missing"
            )));
        };

        let new = NewAppointment {
            patient_id,
            doctor_id,
            cabinet_id,
            date,
            status,
            created_by_assistant_id,
        };
        let id = self.repo.create(&new).await?;
        self.repo.find_summary(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!(
                "appointment {id} missing right after insert"
            ))
        })
    }
}

// ── UpdateAppointment ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateAppointmentInput {
    pub date: Option<String>,
    pub status: Option<String>,
    pub created_by_assistant_id: Option<Option<i64>>,
}

pub struct UpdateAppointmentUseCase<R: AppointmentRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: AppointmentRepository, L: RefLookupPort> UpdateAppointmentUseCase<R, L> {
    pub async fn execute(
        &self,
        id: i64,
        input: UpdateAppointmentInput,
    ) -> Result<AppointmentView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("Appointment"));
        }

        let mut errors = ValidationErrors::new();

        let date: Option<DateTime<Utc>> = match present(input.date.as_deref()) {
            None => None,
            Some(v) => match parse_datetime_exact(v) {
                Some(dt) => Some(dt),
                None => {
                    errors.must_match_format("date", DATE_FORMAT);
                    None
                }
            },
        };

        let status = match present(input.status.as_deref()) {
            None => None,
            Some(v) => match AppointmentStatus::parse(v) {
                Some(s) => Some(s),
                None => {
                    errors.invalid_choice("status");
                    None
                }
            },
        };

        let created_by_assistant_id = match input.created_by_assistant_id {
            None => None,
            Some(None) => Some(None),
            Some(Some(v)) => {
                if self.refs.assistant_exists(v).await? {
                    Some(Some(v))
                } else {
                    errors.invalid_choice("created_by_assistant_id");
                    None
                }
            }
        };

        errors.into_result()?;

        let changes = AppointmentChanges {
            date,
            status,
            created_by_assistant_id,
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_summary(id)
            .await?
            .ok_or(ApiError::NotFound("Appointment"))
    }
}

// ── DeleteAppointment ────────────────────────────────────────────────────────

pub struct DeleteAppointmentUseCase<R: AppointmentRepository> {
    pub repo: R,
}

impl<R: AppointmentRepository> DeleteAppointmentUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Appointment"))
        }
    }
}

// ── Lookups ──────────────────────────────────────────────────────────────────

/// Lookups filter rather than navigate, so an unknown id yields an empty
/// page instead of a 404.
pub struct GetAppointmentsByPatientUseCase<R: AppointmentRepository> {
    pub repo: R,
}

impl<R: AppointmentRepository> GetAppointmentsByPatientUseCase<R> {
    pub async fn execute(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        self.repo.list_by_patient(patient_id, page).await
    }
}

pub struct GetAppointmentsByDoctorUseCase<R: AppointmentRepository> {
    pub repo: R,
}

impl<R: AppointmentRepository> GetAppointmentsByDoctorUseCase<R> {
    pub async fn execute(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        self.repo.list_by_doctor(doctor_id, page).await
    }
}

pub struct GetAppointmentsByCabinetUseCase<R: AppointmentRepository> {
    pub repo: R,
}

impl<R: AppointmentRepository> GetAppointmentsByCabinetUseCase<R> {
    pub async fn execute(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<AppointmentView>, ApiError> {
        self.repo.list_by_cabinet(cabinet_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::usecase::testutil::{StubRefs, appointment, empty_page};

    #[derive(Default)]
    struct MockAppointmentRepo {
        appointment: Option<AppointmentView>,
        created: Mutex<Option<NewAppointment>>,
        updated: Mutex<Option<AppointmentChanges>>,
    }

    impl AppointmentRepository for MockAppointmentRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<AppointmentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_expanded(
            &self,
            page: PageRequest,
        ) -> Result<Page<AppointmentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<AppointmentView>, ApiError> {
            Ok(self.appointment.clone())
        }
        async fn find_summary(&self, _id: i64) -> Result<Option<AppointmentView>, ApiError> {
            Ok(self.appointment.clone())
        }
        async fn exists(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.appointment.is_some())
        }
        async fn create(&self, new: &NewAppointment) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(3)
        }
        async fn update(&self, _id: i64, changes: &AppointmentChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.appointment.is_some())
        }
        async fn list_by_patient(
            &self,
            _patient_id: i64,
            page: PageRequest,
        ) -> Result<Page<AppointmentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_by_doctor(
            &self,
            _doctor_id: i64,
            page: PageRequest,
        ) -> Result<Page<AppointmentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_by_cabinet(
            &self,
            _cabinet_id: i64,
            page: PageRequest,
        ) -> Result<Page<AppointmentView>, ApiError> {
            Ok(empty_page(page))
        }
    }

    fn repo_with_appointment() -> MockAppointmentRepo {
        MockAppointmentRepo {
            appointment: Some(AppointmentView::from(appointment(3))),
            ..Default::default()
        }
    }

    fn create_input() -> CreateAppointmentInput {
        CreateAppointmentInput {
            patient_id: Some(4),
            doctor_id: Some(9),
            cabinet_id: Some(1),
            date: Some("2025-12-01 10:30:00".into()),
            status: Some("SCHEDULED".into()),
            created_by_assistant_id: None,
        }
    }

    #[tokio::test]
    async fn should_create_appointment_with_exact_timestamp() {
        let usecase = CreateAppointmentUseCase {
            repo: repo_with_appointment(),
            refs: StubRefs::default(),
        };
        let view = usecase.execute(create_input()).await.unwrap();
        assert_eq!(view.appointment.id, 3);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Scheduled);
        assert_eq!(stored.date.to_rfc3339(), "2025-12-01T10:30:00+00:00");
        assert_eq!(stored.created_by_assistant_id, None);
    }

    #[tokio::test]
    async fn should_reject_loose_date_formats() {
        let usecase = CreateAppointmentUseCase {
            repo: repo_with_appointment(),
            refs: StubRefs::default(),
        };
        let mut input = create_input();
        input.date = Some("2025-12-01T10:30:00Z".into());
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["date"],
            vec!["The date field must match the format Y-m-d H:i:s."]
        );
    }

    #[tokio::test]
    async fn should_reject_unknown_status() {
        let usecase = CreateAppointmentUseCase {
            repo: repo_with_appointment(),
            refs: StubRefs::default(),
        };
        let mut input = create_input();
        input.status = Some("BOOKED".into());
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(fields["status"], vec!["The selected status is invalid."]);
    }

    #[tokio::test]
    async fn should_collect_every_dangling_reference() {
        let usecase = CreateAppointmentUseCase {
            repo: repo_with_appointment(),
            refs: StubRefs {
                patients: false,
                doctors: false,
                assistants: false,
                ..Default::default()
            },
        };
        let mut input = create_input();
        input.created_by_assistant_id = Some(8);
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = fields.keys().cloned().collect();
        assert_eq!(
            fields,
            vec!["created_by_assistant_id", "doctor_id", "patient_id"]
        );
    }

    #[tokio::test]
    async fn should_patch_status_and_detach_assistant() {
        let usecase = UpdateAppointmentUseCase {
            repo: repo_with_appointment(),
            refs: StubRefs::default(),
        };
        usecase
            .execute(
                3,
                UpdateAppointmentInput {
                    status: Some("CANCELLED".into()),
                    created_by_assistant_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.status, Some(AppointmentStatus::Cancelled));
        assert_eq!(changes.created_by_assistant_id, Some(None));
        assert_eq!(changes.date, None);
    }

    #[tokio::test]
    async fn should_return_not_found_before_validating_a_patch() {
        let usecase = UpdateAppointmentUseCase {
            repo: MockAppointmentRepo::default(),
            refs: StubRefs::default(),
        };
        let result = usecase.execute(3, UpdateAppointmentInput::default()).await;
        assert!(matches!(result, Err(ApiError::NotFound("Appointment"))));
    }

    #[tokio::test]
    async fn should_keep_lookups_empty_for_unknown_owners() {
        let usecase = GetAppointmentsByPatientUseCase {
            repo: MockAppointmentRepo::default(),
        };
        let page = usecase.execute(999, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }
}
