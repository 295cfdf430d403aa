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

use crate::domain::types::{AppointmentView, ConsultationView, PatientView, PrescriptionView};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::patient::{
    CreatePatientInput, CreatePatientUseCase, DeletePatientUseCase,
    GetPatientAppointmentsUseCase, GetPatientConsultationsUseCase,
    GetPatientPrescriptionsUseCase, GetPatientUseCase, ListPatientsUseCase, UpdatePatientInput,
    UpdatePatientUseCase,
};

// ── GET /patients ────────────────────────────────────────────────────────────

pub async fn list_patients(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PatientView>>, ApiError> {
    let usecase = ListPatientsUseCase {
        repo: state.patient_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /patients/{id} ───────────────────────────────────────────────────────

pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PatientView>, ApiError> {
    let usecase = GetPatientUseCase {
        repo: state.patient_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /patients ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePatientRequest {
    pub user_id: Option<i64>,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<String>,
    pub weight: Option<f64>,
    pub medical_history: Option<Value>,
    pub allergies: Option<Value>,
}

pub async fn create_patient(
    State(state): State<AppState>,
    Json(body): Json<CreatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreatePatientUseCase {
        repo: state.patient_repo(),
        refs: state.refs(),
    };
    let patient = usecase
        .execute(CreatePatientInput {
            user_id: body.user_id,
            emergency_contact: body.emergency_contact,
            blood_type: body.blood_type,
            weight: body.weight,
            medical_history: body.medical_history,
            allergies: body.allergies,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Patient created successfully", "patient": patient })),
    ))
}

// ── PUT /patients/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePatientRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub emergency_contact: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub blood_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub weight: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub medical_history: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub allergies: Option<Option<Value>>,
}

pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdatePatientUseCase {
        repo: state.patient_repo(),
    };
    let patient = usecase
        .execute(
            id,
            UpdatePatientInput {
                emergency_contact: body.emergency_contact,
                blood_type: body.blood_type,
                weight: body.weight,
                medical_history: body.medical_history,
                allergies: body.allergies,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Patient updated successfully", "patient": patient }),
    ))
}

// ── DELETE /patients/{id} ────────────────────────────────────────────────────

pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeletePatientUseCase {
        repo: state.patient_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Patient deleted successfully" })))
}

// ── GET /patients/{id}/appointments ──────────────────────────────────────────

pub async fn get_patient_appointments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, ApiError> {
    let usecase = GetPatientAppointmentsUseCase {
        repo: state.patient_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}

// ── GET /patients/{id}/consultations ─────────────────────────────────────────

pub async fn get_patient_consultations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ConsultationView>>, ApiError> {
    let usecase = GetPatientConsultationsUseCase {
        repo: state.patient_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}

// ── GET /patients/{id}/prescriptions ─────────────────────────────────────────

pub async fn get_patient_prescriptions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PrescriptionView>>, ApiError> {
    let usecase = GetPatientPrescriptionsUseCase {
        repo: state.patient_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}
