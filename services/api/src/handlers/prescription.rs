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

use crate::domain::types::PrescriptionView;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::prescription::{
    CreatePrescriptionInput, CreatePrescriptionUseCase, DeletePrescriptionUseCase,
    GetPrescriptionUseCase, GetPrescriptionsByDoctorUseCase, GetPrescriptionsByPatientUseCase,
    ListPrescriptionsUseCase, UpdatePrescriptionInput, UpdatePrescriptionUseCase,
};

// ── GET /prescriptions ───────────────────────────────────────────────────────

pub async fn list_prescriptions(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PrescriptionView>>, ApiError> {
    let usecase = ListPrescriptionsUseCase {
        repo: state.prescription_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /prescriptions/{id} ──────────────────────────────────────────────────

pub async fn get_prescription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PrescriptionView>, ApiError> {
    let usecase = GetPrescriptionUseCase {
        repo: state.prescription_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /prescriptions ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePrescriptionRequest {
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

pub async fn create_prescription(
    State(state): State<AppState>,
    Json(body): Json<CreatePrescriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreatePrescriptionUseCase {
        repo: state.prescription_repo(),
        refs: state.refs(),
    };
    let prescription = usecase
        .execute(CreatePrescriptionInput {
            consultation_id: body.consultation_id,
            patient_id: body.patient_id,
            doctor_id: body.doctor_id,
            prescription_date: body.prescription_date,
            status: body.status,
            medications: body.medications,
            general_instructions: body.general_instructions,
            valid_until: body.valid_until,
            refills_allowed: body.refills_allowed,
            refills_used: body.refills_used,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(
            json!({ "message": "Prescription created successfully", "prescription": prescription }),
        ),
    ))
}

// ── PUT /prescriptions/{id} ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePrescriptionRequest {
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub medications: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub general_instructions: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub valid_until: Option<Option<String>>,
    pub refills_allowed: Option<i32>,
    pub refills_used: Option<i32>,
}

pub async fn update_prescription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePrescriptionRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdatePrescriptionUseCase {
        repo: state.prescription_repo(),
    };
    let prescription = usecase
        .execute(
            id,
            UpdatePrescriptionInput {
                status: body.status,
                medications: body.medications,
                general_instructions: body.general_instructions,
                valid_until: body.valid_until,
                refills_allowed: body.refills_allowed,
                refills_used: body.refills_used,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Prescription updated successfully", "prescription": prescription }),
    ))
}

// ── DELETE /prescriptions/{id} ───────────────────────────────────────────────

pub async fn delete_prescription(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeletePrescriptionUseCase {
        repo: state.prescription_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Prescription deleted successfully" })))
}

// ── GET /prescriptions/patient/{patient_id} ──────────────────────────────────

pub async fn get_prescriptions_by_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PrescriptionView>>, ApiError> {
    let usecase = GetPrescriptionsByPatientUseCase {
        repo: state.prescription_repo(),
    };
    Ok(Json(usecase.execute(patient_id, page.clamped()).await?))
}

// ── GET /prescriptions/doctor/{doctor_id} ────────────────────────────────────

pub async fn get_prescriptions_by_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PrescriptionView>>, ApiError> {
    let usecase = GetPrescriptionsByDoctorUseCase {
        repo: state.prescription_repo(),
    };
    Ok(Json(usecase.execute(doctor_id, page.clamped()).await?))
}
