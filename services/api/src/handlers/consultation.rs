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

use crate::domain::types::ConsultationView;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::consultation::{
    CreateConsultationInput, CreateConsultationUseCase, DeleteConsultationUseCase,
    GetConsultationUseCase, GetConsultationsByDoctorUseCase, GetConsultationsByPatientUseCase,
    ListConsultationsUseCase, UpdateConsultationInput, UpdateConsultationUseCase,
};

// ── GET /consultations ───────────────────────────────────────────────────────

pub async fn list_consultations(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ConsultationView>>, ApiError> {
    let usecase = ListConsultationsUseCase {
        repo: state.consultation_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /consultations/{id} ──────────────────────────────────────────────────

pub async fn get_consultation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ConsultationView>, ApiError> {
    let usecase = GetConsultationUseCase {
        repo: state.consultation_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /consultations ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateConsultationRequest {
    pub appointment_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub notes: Option<String>,
    pub prescriptions: Option<Value>,
    pub attachments: Option<Value>,
}

pub async fn create_consultation(
    State(state): State<AppState>,
    Json(body): Json<CreateConsultationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreateConsultationUseCase {
        repo: state.consultation_repo(),
        refs: state.refs(),
    };
    let consultation = usecase
        .execute(CreateConsultationInput {
            appointment_id: body.appointment_id,
            doctor_id: body.doctor_id,
            patient_id: body.patient_id,
            notes: body.notes,
            prescriptions: body.prescriptions,
            attachments: body.attachments,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(
            json!({ "message": "Consultation created successfully", "consultation": consultation }),
        ),
    ))
}

// ── PUT /consultations/{id} ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateConsultationRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub prescriptions: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub attachments: Option<Option<Value>>,
}

pub async fn update_consultation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateConsultationRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdateConsultationUseCase {
        repo: state.consultation_repo(),
    };
    let consultation = usecase
        .execute(
            id,
            UpdateConsultationInput {
                notes: body.notes,
                prescriptions: body.prescriptions,
                attachments: body.attachments,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Consultation updated successfully", "consultation": consultation }),
    ))
}

// ── DELETE /consultations/{id} ───────────────────────────────────────────────

pub async fn delete_consultation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeleteConsultationUseCase {
        repo: state.consultation_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Consultation deleted successfully" })))
}

// ── GET /consultations/patient/{patient_id} ──────────────────────────────────

pub async fn get_consultations_by_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ConsultationView>>, ApiError> {
    let usecase = GetConsultationsByPatientUseCase {
        repo: state.consultation_repo(),
    };
    Ok(Json(usecase.execute(patient_id, page.clamped()).await?))
}

// ── GET /consultations/doctor/{doctor_id} ────────────────────────────────────

pub async fn get_consultations_by_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ConsultationView>>, ApiError> {
    let usecase = GetConsultationsByDoctorUseCase {
        repo: state.consultation_repo(),
    };
    Ok(Json(usecase.execute(doctor_id, page.clamped()).await?))
}
