//! The `all/*` bulk browse endpoints. Same page envelope as the resource
//! lists but with the wide embeds and a default page size of 50.

use axum::{
    Json,
    extract::{Query, State},
};

use medworld_domain::pagination::{BulkPageRequest, Page};

use crate::domain::types::{
    AppointmentView, AssistantView, CabinetView, ConsultationView, DoctorView, PatientView,
    UserView,
};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::browse::{
    BrowseAppointmentsUseCase, BrowseAssistantsUseCase, BrowseCabinetsUseCase,
    BrowseConsultationsUseCase, BrowseDoctorsUseCase, BrowsePatientsUseCase, BrowseUsersUseCase,
};

// ── GET /all/doctors ─────────────────────────────────────────────────────────

pub async fn list_all_doctors(
    State(state): State<AppState>,
    Query(page): Query<BulkPageRequest>,
) -> Result<Json<Page<DoctorView>>, ApiError> {
    let usecase = BrowseDoctorsUseCase {
        repo: state.doctor_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /all/cabinets ────────────────────────────────────────────────────────

pub async fn list_all_cabinets(
    State(state): State<AppState>,
    Query(page): Query<BulkPageRequest>,
) -> Result<Json<Page<CabinetView>>, ApiError> {
    let usecase = BrowseCabinetsUseCase {
        repo: state.cabinet_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /all/patients ────────────────────────────────────────────────────────

pub async fn list_all_patients(
    State(state): State<AppState>,
    Query(page): Query<BulkPageRequest>,
) -> Result<Json<Page<PatientView>>, ApiError> {
    let usecase = BrowsePatientsUseCase {
        repo: state.patient_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /all/appointments ────────────────────────────────────────────────────

pub async fn list_all_appointments(
    State(state): State<AppState>,
    Query(page): Query<BulkPageRequest>,
) -> Result<Json<Page<AppointmentView>>, ApiError> {
    let usecase = BrowseAppointmentsUseCase {
        repo: state.appointment_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /all/assistants ──────────────────────────────────────────────────────

pub async fn list_all_assistants(
    State(state): State<AppState>,
    Query(page): Query<BulkPageRequest>,
) -> Result<Json<Page<AssistantView>>, ApiError> {
    let usecase = BrowseAssistantsUseCase {
        repo: state.assistant_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /all/consultations ───────────────────────────────────────────────────

pub async fn list_all_consultations(
    State(state): State<AppState>,
    Query(page): Query<BulkPageRequest>,
) -> Result<Json<Page<ConsultationView>>, ApiError> {
    let usecase = BrowseConsultationsUseCase {
        repo: state.consultation_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /all/users ───────────────────────────────────────────────────────────

pub async fn list_all_users(
    State(state): State<AppState>,
    Query(page): Query<BulkPageRequest>,
) -> Result<Json<Page<UserView>>, ApiError> {
    let usecase = BrowseUsersUseCase {
        repo: state.user_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}
