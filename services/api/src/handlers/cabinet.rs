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

use crate::domain::types::{AppointmentView, AssistantView, CabinetView, DoctorView, RatingView};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::cabinet::{
    CreateCabinetInput, CreateCabinetUseCase, DeleteCabinetUseCase, GetCabinetAppointmentsUseCase,
    GetCabinetAssistantsUseCase, GetCabinetDoctorsUseCase, GetCabinetRatingsUseCase,
    GetCabinetUseCase, ListCabinetsUseCase, UpdateCabinetInput, UpdateCabinetUseCase,
};

// ── GET /cabinets ────────────────────────────────────────────────────────────

pub async fn list_cabinets(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<CabinetView>>, ApiError> {
    let usecase = ListCabinetsUseCase {
        repo: state.cabinet_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /cabinets/{id} ───────────────────────────────────────────────────────

pub async fn get_cabinet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CabinetView>, ApiError> {
    let usecase = GetCabinetUseCase {
        repo: state.cabinet_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /cabinets ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCabinetRequest {
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub access_handicap: Option<bool>,
    pub has_parking: Option<bool>,
    pub has_wifi: Option<bool>,
    pub accepts_urgent: Option<bool>,
    pub accepts_insurance: Option<bool>,
    pub opening_hours: Option<Value>,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
}

pub async fn create_cabinet(
    State(state): State<AppState>,
    Json(body): Json<CreateCabinetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreateCabinetUseCase {
        repo: state.cabinet_repo(),
        refs: state.refs(),
    };
    let cabinet = usecase
        .execute(CreateCabinetInput {
            user_id: body.user_id,
            name: body.name,
            phone: body.phone,
            access_handicap: body.access_handicap,
            has_parking: body.has_parking,
            has_wifi: body.has_wifi,
            accepts_urgent: body.accepts_urgent,
            accepts_insurance: body.accepts_insurance,
            opening_hours: body.opening_hours,
            location_lat: body.location_lat,
            location_lng: body.location_lng,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Cabinet created successfully", "cabinet": cabinet })),
    ))
}

// ── PUT /cabinets/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCabinetRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub access_handicap: Option<bool>,
    pub has_parking: Option<bool>,
    pub has_wifi: Option<bool>,
    pub accepts_urgent: Option<bool>,
    pub accepts_insurance: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub opening_hours: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_lng: Option<Option<f64>>,
}

pub async fn update_cabinet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCabinetRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdateCabinetUseCase {
        repo: state.cabinet_repo(),
    };
    let cabinet = usecase
        .execute(
            id,
            UpdateCabinetInput {
                name: body.name,
                phone: body.phone,
                access_handicap: body.access_handicap,
                has_parking: body.has_parking,
                has_wifi: body.has_wifi,
                accepts_urgent: body.accepts_urgent,
                accepts_insurance: body.accepts_insurance,
                opening_hours: body.opening_hours,
                location_lat: body.location_lat,
                location_lng: body.location_lng,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Cabinet updated successfully", "cabinet": cabinet }),
    ))
}

// ── DELETE /cabinets/{id} ────────────────────────────────────────────────────

pub async fn delete_cabinet(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeleteCabinetUseCase {
        repo: state.cabinet_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Cabinet deleted successfully" })))
}

// ── GET /cabinets/{id}/doctors ───────────────────────────────────────────────

pub async fn get_cabinet_doctors(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<DoctorView>>, ApiError> {
    let usecase = GetCabinetDoctorsUseCase {
        repo: state.cabinet_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}

// ── GET /cabinets/{id}/assistants ────────────────────────────────────────────

pub async fn get_cabinet_assistants(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AssistantView>>, ApiError> {
    let usecase = GetCabinetAssistantsUseCase {
        repo: state.cabinet_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}

// ── GET /cabinets/{id}/appointments ──────────────────────────────────────────

pub async fn get_cabinet_appointments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AppointmentView>>, ApiError> {
    let usecase = GetCabinetAppointmentsUseCase {
        repo: state.cabinet_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}

// ── GET /cabinets/{id}/ratings ───────────────────────────────────────────────

pub async fn get_cabinet_ratings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<RatingView>>, ApiError> {
    let usecase = GetCabinetRatingsUseCase {
        repo: state.cabinet_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}
