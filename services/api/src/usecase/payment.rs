use chrono::{DateTime, Utc};

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{PaymentRepository, RefLookupPort};
use crate::domain::types::{NewPayment, PaymentChanges, PaymentStatus, PaymentView, parse_datetime};
use crate::error::{ApiError, ValidationErrors};
use crate::usecase::{present, present_owned};

// ── ListPayments ─────────────────────────────────────────────────────────────

pub struct ListPaymentsUseCase<R: PaymentRepository> {
    pub repo: R,
}

impl<R: PaymentRepository> ListPaymentsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<PaymentView>, ApiError> {
        self.repo.list(page).await
    }
}

// ── GetPayment ───────────────────────────────────────────────────────────────

pub struct GetPaymentUseCase<R: PaymentRepository> {
    pub repo: R,
}

impl<R: PaymentRepository> GetPaymentUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<PaymentView, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Payment"))
    }
}

// ── RecordPayment ────────────────────────────────────────────────────────────

pub struct RecordPaymentInput {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub appointment_id: Option<i64>,
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub transaction_date: Option<String>,
    pub notes: Option<String>,
}

pub struct RecordPaymentUseCase<R: PaymentRepository, L: RefLookupPort> {
    pub repo: R,
    pub refs: L,
}

impl<R: PaymentRepository, L: RefLookupPort> RecordPaymentUseCase<R, L> {
    pub async fn execute(&self, input: RecordPaymentInput) -> Result<PaymentView, ApiError> {
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
        let appointment_id = match input.appointment_id {
            None => None,
            Some(v) => {
                if self.refs.appointment_exists(v).await? {
                    Some(v)
                } else {
                    errors.invalid_choice("appointment_id");
                    None
                }
            }
        };

        let amount = match input.amount {
            None => {
                errors.required("amount");
                None
            }
            Some(v) if v < 0.0 => {
                errors.min_value("amount", 0);
                None
            }
            Some(v) => Some(v),
        };

        let status = match present(input.status.as_deref()) {
            None => {
                errors.required("status");
                None
            }
            Some(v) => match PaymentStatus::parse(v) {
                Some(s) => Some(s),
                None => {
                    errors.invalid_choice("status");
                    None
                }
            },
        };

        let payment_method = match present(input.payment_method.as_deref()) {
            None => {
                errors.required("payment_method");
                None
            }
            Some(v) if v.chars().count() > 50 => {
                errors.max_chars("payment_method", 50);
                None
            }
            Some(v) => Some(v),
        };

        let transaction_date = match present(input.transaction_date.as_deref()) {
            None => {
                errors.required("transaction_date");
                None
            }
            Some(v) => match parse_datetime(v) {
                Some(dt) => Some(dt),
                None => {
                    errors.must_be_date("transaction_date");
                    None
                }
            },
        };

        errors.into_result()?;
        let (
            Some(patient_id),
            Some(doctor_id),
            Some(cabinet_id),
            Some(amount),
            Some(status),
            Some(payment_method),
            Some(transaction_date),
        ) = (
            patient_id,
            doctor_id,
            cabinet_id,
            amount,
            status,
            payment_method,
            transaction_date,
        )
        else {
            return Err(ApiError::Internal(anyhow::anyhow!(
                "payment validation passed with required fields missing"
            )));
        };

        let new = NewPayment {
            patient_id,
            doctor_id,
            cabinet_id,
            appointment_id,
            amount,
            status,
            payment_method: payment_method.to_owned(),
            transaction_date,
            notes: present_owned(input.notes),
        };
        let id = self.repo.create(&new).await?;
        self.repo.find_by_id(id).await?.ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("payment {id} missing right after insert"))
        })
    }
}

// ── UpdatePayment ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdatePaymentInput {
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub transaction_date: Option<String>,
    pub notes: Option<Option<String>>,
}

pub struct UpdatePaymentUseCase<R: PaymentRepository> {
    pub repo: R,
}

impl<R: PaymentRepository> UpdatePaymentUseCase<R> {
    pub async fn execute(&self, id: i64, input: UpdatePaymentInput) -> Result<PaymentView, ApiError> {
        if !self.repo.exists(id).await? {
            return Err(ApiError::NotFound("Payment"));
        }

        let mut errors = ValidationErrors::new();

        let amount = match input.amount {
            Some(v) if v < 0.0 => {
                errors.min_value("amount", 0);
                None
            }
            other => other,
        };

        let status = match present(input.status.as_deref()) {
            None => None,
            Some(v) => match PaymentStatus::parse(v) {
                Some(s) => Some(s),
                None => {
                    errors.invalid_choice("status");
                    None
                }
            },
        };

        let payment_method = match present_owned(input.payment_method) {
            Some(v) if v.chars().count() > 50 => {
                errors.max_chars("payment_method", 50);
                None
            }
            other => other,
        };

        let transaction_date: Option<DateTime<Utc>> =
            match present(input.transaction_date.as_deref()) {
                None => None,
                Some(v) => match parse_datetime(v) {
                    Some(dt) => Some(dt),
                    None => {
                        errors.must_be_date("transaction_date");
                        None
                    }
                },
            };

        errors.into_result()?;

        let changes = PaymentChanges {
            amount,
            status,
            payment_method,
            transaction_date,
            notes: input.notes.map(present_owned),
        };
        self.repo.update(id, &changes).await?;
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound("Payment"))
    }
}

// ── DeletePayment ────────────────────────────────────────────────────────────

pub struct DeletePaymentUseCase<R: PaymentRepository> {
    pub repo: R,
}

impl<R: PaymentRepository> DeletePaymentUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<(), ApiError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound("Payment"))
        }
    }
}

// ── Lookups ──────────────────────────────────────────────────────────────────

pub struct GetPaymentsByPatientUseCase<R: PaymentRepository> {
    pub repo: R,
}

impl<R: PaymentRepository> GetPaymentsByPatientUseCase<R> {
    pub async fn execute(
        &self,
        patient_id: i64,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError> {
        self.repo.list_by_patient(patient_id, page).await
    }
}

pub struct GetPaymentsByDoctorUseCase<R: PaymentRepository> {
    pub repo: R,
}

impl<R: PaymentRepository> GetPaymentsByDoctorUseCase<R> {
    pub async fn execute(
        &self,
        doctor_id: i64,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError> {
        self.repo.list_by_doctor(doctor_id, page).await
    }
}

pub struct GetPaymentsByCabinetUseCase<R: PaymentRepository> {
    pub repo: R,
}

impl<R: PaymentRepository> GetPaymentsByCabinetUseCase<R> {
    pub async fn execute(
        &self,
        cabinet_id: i64,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError> {
        self.repo.list_by_cabinet(cabinet_id, page).await
    }
}

/// Status lookups take the path segment as-is. An unknown status is not an
/// error, it simply matches no rows.
pub struct GetPaymentsByStatusUseCase<R: PaymentRepository> {
    pub repo: R,
}

impl<R: PaymentRepository> GetPaymentsByStatusUseCase<R> {
    pub async fn execute(
        &self,
        status: &str,
        page: PageRequest,
    ) -> Result<Page<PaymentView>, ApiError> {
        self.repo.list_by_status(status, page).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::usecase::testutil::{StubRefs, empty_page, payment};

    #[derive(Default)]
    struct MockPaymentRepo {
        payment: Option<PaymentView>,
        created: Mutex<Option<NewPayment>>,
        updated: Mutex<Option<PaymentChanges>>,
    }

    impl PaymentRepository for MockPaymentRepo {
        async fn list(&self, page: PageRequest) -> Result<Page<PaymentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<PaymentView>, ApiError> {
            Ok(self.payment.clone())
        }
        async fn exists(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.payment.is_some())
        }
        async fn create(&self, new: &NewPayment) -> Result<i64, ApiError> {
            *self.created.lock().unwrap() = Some(new.clone());
            Ok(11)
        }
        async fn update(&self, _id: i64, changes: &PaymentChanges) -> Result<(), ApiError> {
            *self.updated.lock().unwrap() = Some(changes.clone());
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<bool, ApiError> {
            Ok(self.payment.is_some())
        }
        async fn list_by_patient(
            &self,
            _patient_id: i64,
            page: PageRequest,
        ) -> Result<Page<PaymentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_by_doctor(
            &self,
            _doctor_id: i64,
            page: PageRequest,
        ) -> Result<Page<PaymentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_by_cabinet(
            &self,
            _cabinet_id: i64,
            page: PageRequest,
        ) -> Result<Page<PaymentView>, ApiError> {
            Ok(empty_page(page))
        }
        async fn list_by_status(
            &self,
            _status: &str,
            page: PageRequest,
        ) -> Result<Page<PaymentView>, ApiError> {
            Ok(empty_page(page))
        }
    }

    fn repo_with_payment() -> MockPaymentRepo {
        MockPaymentRepo {
            payment: Some(PaymentView::from(payment(11))),
            ..Default::default()
        }
    }

    fn record_input() -> RecordPaymentInput {
        RecordPaymentInput {
            patient_id: Some(4),
            doctor_id: Some(9),
            cabinet_id: Some(1),
            appointment_id: Some(3),
            amount: Some(2500.0),
            status: Some("pending".into()),
            payment_method: Some("cash".into()),
            transaction_date: Some("2025-11-22 10:00:00".into()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn should_record_payment_with_linked_appointment() {
        let usecase = RecordPaymentUseCase {
            repo: repo_with_payment(),
            refs: StubRefs::default(),
        };
        let view = usecase.execute(record_input()).await.unwrap();
        assert_eq!(view.payment.id, 11);

        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.appointment_id, Some(3));
        assert_eq!(stored.amount, 2500.0);
        assert_eq!(stored.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn should_reject_negative_amount() {
        let usecase = RecordPaymentUseCase {
            repo: repo_with_payment(),
            refs: StubRefs::default(),
        };
        let mut input = record_input();
        input.amount = Some(-50.0);
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["amount"],
            vec!["The amount field must be at least 0."]
        );
    }

    #[tokio::test]
    async fn should_limit_payment_method_length() {
        let usecase = RecordPaymentUseCase {
            repo: repo_with_payment(),
            refs: StubRefs::default(),
        };
        let mut input = record_input();
        input.payment_method = Some("x".repeat(51));
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(
            fields["payment_method"],
            vec!["The payment method field must not be greater than 50 characters."]
        );
    }

    #[tokio::test]
    async fn should_reject_unknown_status_choice() {
        let usecase = RecordPaymentUseCase {
            repo: repo_with_payment(),
            refs: StubRefs::default(),
        };
        let mut input = record_input();
        input.status = Some("PAID".into());
        let Err(ApiError::Validation(fields)) = usecase.execute(input).await else {
            panic!("expected validation failure");
        };
        assert_eq!(fields["status"], vec!["The selected status is invalid."]);
    }

    #[tokio::test]
    async fn should_accept_payment_without_appointment() {
        let usecase = RecordPaymentUseCase {
            repo: repo_with_payment(),
            refs: StubRefs::default(),
        };
        let mut input = record_input();
        input.appointment_id = None;
        usecase.execute(input).await.unwrap();
        let stored = usecase.repo.created.lock().unwrap().clone().unwrap();
        assert_eq!(stored.appointment_id, None);
    }

    #[tokio::test]
    async fn should_patch_status_and_clear_notes() {
        let usecase = UpdatePaymentUseCase {
            repo: repo_with_payment(),
        };
        usecase
            .execute(
                11,
                UpdatePaymentInput {
                    status: Some("completed".into()),
                    notes: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let changes = usecase.repo.updated.lock().unwrap().clone().unwrap();
        assert_eq!(changes.status, Some(PaymentStatus::Completed));
        assert_eq!(changes.notes, Some(None));
        assert_eq!(changes.amount, None);
    }

    #[tokio::test]
    async fn should_pass_status_lookups_through_verbatim() {
        let usecase = GetPaymentsByStatusUseCase {
            repo: MockPaymentRepo::default(),
        };
        let page = usecase
            .execute("whatever", PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
