use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use medworld_core::serde::double_option;
use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::types::PaymentView;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::payment::{
    DeletePaymentUseCase, GetPaymentUseCase, GetPaymentsByCabinetUseCase,
    GetPaymentsByDoctorUseCase, GetPaymentsByPatientUseCase, GetPaymentsByStatusUseCase,
    ListPaymentsUseCase, RecordPaymentInput, RecordPaymentUseCase, UpdatePaymentInput,
    UpdatePaymentUseCase,
};

// ── GET /payments ────────────────────────────────────────────────────────────

pub async fn list_payments(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PaymentView>>, ApiError> {
    let usecase = ListPaymentsUseCase {
        repo: state.payment_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /payments/{id} ───────────────────────────────────────────────────────

pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PaymentView>, ApiError> {
    let usecase = GetPaymentUseCase {
        repo: state.payment_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /payments ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RecordPaymentRequest {
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

pub async fn record_payment(
    State(state): State<AppState>,
    Json(body): Json<RecordPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = RecordPaymentUseCase {
        repo: state.payment_repo(),
        refs: state.refs(),
    };
    let payment = usecase
        .execute(RecordPaymentInput {
            patient_id: body.patient_id,
            doctor_id: body.doctor_id,
            cabinet_id: body.cabinet_id,
            appointment_id: body.appointment_id,
            amount: body.amount,
            status: body.status,
            payment_method: body.payment_method,
            transaction_date: body.transaction_date,
            notes: body.notes,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Payment created successfully", "payment": payment })),
    ))
}

// ── PUT /payments/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePaymentRequest {
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub transaction_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePaymentRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdatePaymentUseCase {
        repo: state.payment_repo(),
    };
    let payment = usecase
        .execute(
            id,
            UpdatePaymentInput {
                amount: body.amount,
                status: body.status,
                payment_method: body.payment_method,
                transaction_date: body.transaction_date,
                notes: body.notes,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Payment updated successfully", "payment": payment }),
    ))
}

// ── DELETE /payments/{id} ────────────────────────────────────────────────────

pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeletePaymentUseCase {
        repo: state.payment_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Payment deleted successfully" })))
}

// ── GET /payments/patient/{patient_id} ───────────────────────────────────────

pub async fn get_payments_by_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PaymentView>>, ApiError> {
    let usecase = GetPaymentsByPatientUseCase {
        repo: state.payment_repo(),
    };
    Ok(Json(usecase.execute(patient_id, page.clamped()).await?))
}

// ── GET /payments/doctor/{doctor_id} ─────────────────────────────────────────

pub async fn get_payments_by_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PaymentView>>, ApiError> {
    let usecase = GetPaymentsByDoctorUseCase {
        repo: state.payment_repo(),
    };
    Ok(Json(usecase.execute(doctor_id, page.clamped()).await?))
}

// ── GET /payments/cabinet/{cabinet_id} ───────────────────────────────────────

pub async fn get_payments_by_cabinet(
    State(state): State<AppState>,
    Path(cabinet_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PaymentView>>, ApiError> {
    let usecase = GetPaymentsByCabinetUseCase {
        repo: state.payment_repo(),
    };
    Ok(Json(usecase.execute(cabinet_id, page.clamped()).await?))
}

// ── GET /payments/status/{status} ────────────────────────────────────────────

pub async fn get_payments_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PaymentView>>, ApiError> {
    let usecase = GetPaymentsByStatusUseCase {
        repo: state.payment_repo(),
    };
    Ok(Json(usecase.execute(&status, page.clamped()).await?))
}
