use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    AppointmentView, AssistantView, ConsultationView, DoctorSearchFilter, DoctorView, PatientView,
};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::doctor::{
    CreateDoctorInput, CreateDoctorUseCase, DeleteDoctorUseCase, GetDoctorAppointmentsUseCase,
    GetDoctorAssistantsUseCase, GetDoctorConsultationsUseCase, GetDoctorPatientsUseCase,
    GetDoctorUseCase, ListDoctorsUseCase, SearchDoctorsUseCase, UpdateDoctorInput,
    UpdateDoctorUseCase,
};

// ── GET /doctors ─────────────────────────────────────────────────────────────

pub async fn list_doctors(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<DoctorView>>, ApiError> {
    let usecase = ListDoctorsUseCase {
        repo: state.doctor_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /doctors/search/filter ───────────────────────────────────────────────

/// Search filters plus paging in one query string. The paging fields live here
/// rather than in a second extractor because axum deserializes the query
/// string exactly once.
#[derive(Deserialize)]
pub struct DoctorSearchQuery {
    pub speciality: Option<String>,
    pub cabinet_id: Option<i64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub available: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn search_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Page<DoctorView>>, ApiError> {
    // `?available`, `?available=1`, `?available=yes` all switch the filter on;
    // an absent parameter, `0` and `false` leave it off.
    let available = matches!(
        query.available.as_deref(),
        Some(v) if !v.is_empty() && v != "0" && v != "false"
    );
    let defaults = PageRequest::default();
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(defaults.per_page),
        page: query.page.unwrap_or(defaults.page),
    }
    .clamped();

    let usecase = SearchDoctorsUseCase {
        repo: state.doctor_repo(),
    };
    let filter = DoctorSearchFilter {
        speciality: query.speciality,
        cabinet_id: query.cabinet_id,
        price_min: query.price_min,
        price_max: query.price_max,
        available,
    };
    Ok(Json(usecase.execute(filter, page).await?))
}

// ── GET /doctors/{id} ────────────────────────────────────────────────────────

pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DoctorView>, ApiError> {
    let usecase = GetDoctorUseCase {
        repo: state.doctor_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /doctors ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateDoctorRequest {
    pub user_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub speciality: Option<String>,
    pub career_start: Option<String>,
    pub consultation_price: Option<f64>,
    pub consultation_duration: Option<i32>,
}

pub async fn create_doctor(
    State(state): State<AppState>,
    Json(body): Json<CreateDoctorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreateDoctorUseCase {
        repo: state.doctor_repo(),
        refs: state.refs(),
    };
    let doctor = usecase
        .execute(CreateDoctorInput {
            user_id: body.user_id,
            cabinet_id: body.cabinet_id,
            speciality: body.speciality,
            career_start: body.career_start,
            consultation_price: body.consultation_price,
            consultation_duration: body.consultation_duration,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Doctor created successfully", "doctor": doctor })),
    ))
}

// ── PUT /doctors/{id} ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateDoctorRequest {
    pub cabinet_id: Option<i64>,
    pub speciality: Option<String>,
    pub career_start: Option<String>,
    pub consultation_price: Option<f64>,
    pub consultation_duration: Option<i32>,
}

pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdateDoctorUseCase {
        repo: state.doctor_repo(),
        refs: state.refs(),
    };
    let doctor = usecase
        .execute(
            id,
            UpdateDoctorInput {
                cabinet_id: body.cabinet_id,
                speciality: body.speciality,
                career_start: body.career_start,
                consultation_price: body.consultation_price,
                consultation_duration: body.consultation_duration,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Doctor updated successfully", "doctor": doctor }),
    ))
}

// ── DELETE /doctors/{id} ─────────────────────────────────────────────────────

pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeleteDoctorUseCase {
        repo: state.doctor_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Doctor deleted successfully" })))
}

// ── GET /doctors/{id}/appointments ───────────────────────────────────────────

pub async fn get_doctor_appointments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, ApiError> {
    let usecase = GetDoctorAppointmentsUseCase {
        repo: state.doctor_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}

// ── GET /doctors/{id}/consultations ──────────────────────────────────────────

pub async fn get_doctor_consultations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ConsultationView>>, ApiError> {
    let usecase = GetDoctorConsultationsUseCase {
        repo: state.doctor_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}

// ── GET /doctors/{id}/assistants ─────────────────────────────────────────────

pub async fn get_doctor_assistants(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AssistantView>>, ApiError> {
    let usecase = GetDoctorAssistantsUseCase {
        repo: state.doctor_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}

// ── GET /doctors/{id}/patients ───────────────────────────────────────────────

pub async fn get_doctor_patients(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PatientView>>, ApiError> {
    let usecase = GetDoctorPatientsUseCase {
        repo: state.doctor_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}
