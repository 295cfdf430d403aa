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

use crate::domain::types::AppointmentView;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::appointment::{
    CreateAppointmentInput, CreateAppointmentUseCase, DeleteAppointmentUseCase,
    GetAppointmentUseCase, GetAppointmentsByCabinetUseCase, GetAppointmentsByDoctorUseCase,
    GetAppointmentsByPatientUseCase, ListAppointmentsUseCase, UpdateAppointmentInput,
    UpdateAppointmentUseCase,
};

// ── GET /appointments ────────────────────────────────────────────────────────

pub async fn list_appointments(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, ApiError> {
    let usecase = ListAppointmentsUseCase {
        repo: state.appointment_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /appointments/{id} ───────────────────────────────────────────────────

pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AppointmentView>, ApiError> {
    let usecase = GetAppointmentUseCase {
        repo: state.appointment_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /appointments ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub created_by_assistant_id: Option<i64>,
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreateAppointmentUseCase {
        repo: state.appointment_repo(),
        refs: state.refs(),
    };
    let appointment = usecase
        .execute(CreateAppointmentInput {
            patient_id: body.patient_id,
            doctor_id: body.doctor_id,
            cabinet_id: body.cabinet_id,
            date: body.date,
            status: body.status,
            created_by_assistant_id: body.created_by_assistant_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Appointment created successfully", "appointment": appointment })),
    ))
}

// ── PUT /appointments/{id} ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateAppointmentRequest {
    pub date: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub created_by_assistant_id: Option<Option<i64>>,
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdateAppointmentUseCase {
        repo: state.appointment_repo(),
        refs: state.refs(),
    };
    let appointment = usecase
        .execute(
            id,
            UpdateAppointmentInput {
                date: body.date,
                status: body.status,
                created_by_assistant_id: body.created_by_assistant_id,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Appointment updated successfully", "appointment": appointment }),
    ))
}

// ── DELETE /appointments/{id} ────────────────────────────────────────────────

pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeleteAppointmentUseCase {
        repo: state.appointment_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Appointment deleted successfully" })))
}

// ── GET /appointments/patient/{patient_id} ───────────────────────────────────

pub async fn get_appointments_by_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, ApiError> {
    let usecase = GetAppointmentsByPatientUseCase {
        repo: state.appointment_repo(),
    };
    Ok(Json(usecase.execute(patient_id, page.clamped()).await?))
}

// ── GET /appointments/doctor/{doctor_id} ─────────────────────────────────────

pub async fn get_appointments_by_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, ApiError> {
    let usecase = GetAppointmentsByDoctorUseCase {
        repo: state.appointment_repo(),
    };
    Ok(Json(usecase.execute(doctor_id, page.clamped()).await?))
}

// ── GET /appointments/cabinet/{cabinet_id} ───────────────────────────────────

pub async fn get_appointments_by_cabinet(
    State(state): State<AppState>,
    Path(cabinet_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, ApiError> {
    let usecase = GetAppointmentsByCabinetUseCase {
        repo: state.appointment_repo(),
    };
    Ok(Json(usecase.execute(cabinet_id, page.clamped()).await?))
}
