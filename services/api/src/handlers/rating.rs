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

use crate::domain::types::RatingView;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::rating::{
    CreateRatingInput, CreateRatingUseCase, DeleteRatingUseCase, GetRatingUseCase,
    GetRatingsByCabinetUseCase, GetRatingsByPatientUseCase, ListRatingsUseCase, UpdateRatingInput,
    UpdateRatingUseCase,
};

// ── GET /ratings ─────────────────────────────────────────────────────────────

pub async fn list_ratings(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<RatingView>>, ApiError> {
    let usecase = ListRatingsUseCase {
        repo: state.rating_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /ratings/{id} ────────────────────────────────────────────────────────

pub async fn get_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RatingView>, ApiError> {
    let usecase = GetRatingUseCase {
        repo: state.rating_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /ratings ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateRatingRequest {
    pub patient_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub date: Option<String>,
    pub equippement: Option<Value>,
    pub user_experience: Option<Value>,
    pub review: Option<String>,
}

pub async fn create_rating(
    State(state): State<AppState>,
    Json(body): Json<CreateRatingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreateRatingUseCase {
        repo: state.rating_repo(),
        refs: state.refs(),
    };
    let rating = usecase
        .execute(CreateRatingInput {
            patient_id: body.patient_id,
            cabinet_id: body.cabinet_id,
            date: body.date,
            equippement: body.equippement,
            user_experience: body.user_experience,
            review: body.review,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Rating created successfully", "rating": rating })),
    ))
}

// ── PUT /ratings/{id} ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateRatingRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub equippement: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub user_experience: Option<Option<Value>>,
    #[serde(default, deserialize_with = "double_option")]
    pub review: Option<Option<String>>,
}

pub async fn update_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRatingRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdateRatingUseCase {
        repo: state.rating_repo(),
    };
    let rating = usecase
        .execute(
            id,
            UpdateRatingInput {
                equippement: body.equippement,
                user_experience: body.user_experience,
                review: body.review,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Rating updated successfully", "rating": rating }),
    ))
}

// ── DELETE /ratings/{id} ─────────────────────────────────────────────────────

pub async fn delete_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeleteRatingUseCase {
        repo: state.rating_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Rating deleted successfully" })))
}

// ── GET /ratings/cabinet/{cabinet_id} ────────────────────────────────────────

pub async fn get_ratings_by_cabinet(
    State(state): State<AppState>,
    Path(cabinet_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<RatingView>>, ApiError> {
    let usecase = GetRatingsByCabinetUseCase {
        repo: state.rating_repo(),
    };
    Ok(Json(usecase.execute(cabinet_id, page.clamped()).await?))
}

// ── GET /ratings/patient/{patient_id} ────────────────────────────────────────

pub async fn get_ratings_by_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<RatingView>>, ApiError> {
    let usecase = GetRatingsByPatientUseCase {
        repo: state.rating_repo(),
    };
    Ok(Json(usecase.execute(patient_id, page.clamped()).await?))
}
