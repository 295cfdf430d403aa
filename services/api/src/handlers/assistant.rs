use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use medworld_domain::pagination::{Page, PageRequest};

use crate::domain::types::{AssistantView, DoctorView};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::assistant::{
    AttachDoctorInput, AttachDoctorUseCase, CreateAssistantInput, CreateAssistantUseCase,
    DeleteAssistantUseCase, DetachDoctorUseCase, GetAssistantDoctorsUseCase, GetAssistantUseCase,
    ListAssistantsUseCase, UpdateAssistantInput, UpdateAssistantUseCase,
};

// ── GET /assistants ──────────────────────────────────────────────────────────

pub async fn list_assistants(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<AssistantView>>, ApiError> {
    let usecase = ListAssistantsUseCase {
        repo: state.assistant_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /assistants/{id} ─────────────────────────────────────────────────────

pub async fn get_assistant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AssistantView>, ApiError> {
    let usecase = GetAssistantUseCase {
        repo: state.assistant_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /assistants ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateAssistantRequest {
    pub user_id: Option<i64>,
    pub cabinet_id: Option<i64>,
}

pub async fn create_assistant(
    State(state): State<AppState>,
    Json(body): Json<CreateAssistantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = CreateAssistantUseCase {
        repo: state.assistant_repo(),
        refs: state.refs(),
    };
    let assistant = usecase
        .execute(CreateAssistantInput {
            user_id: body.user_id,
            cabinet_id: body.cabinet_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Assistant created successfully", "assistant": assistant })),
    ))
}

// ── PUT /assistants/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateAssistantRequest {
    pub cabinet_id: Option<i64>,
}

pub async fn update_assistant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateAssistantRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdateAssistantUseCase {
        repo: state.assistant_repo(),
        refs: state.refs(),
    };
    let assistant = usecase
        .execute(
            id,
            UpdateAssistantInput {
                cabinet_id: body.cabinet_id,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Assistant updated successfully", "assistant": assistant }),
    ))
}

// ── DELETE /assistants/{id} ──────────────────────────────────────────────────

pub async fn delete_assistant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeleteAssistantUseCase {
        repo: state.assistant_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Assistant deleted successfully" })))
}

// ── GET /assistants/{id}/doctors ─────────────────────────────────────────────

pub async fn get_assistant_doctors(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<DoctorView>>, ApiError> {
    let usecase = GetAssistantDoctorsUseCase {
        repo: state.assistant_repo(),
    };
    Ok(Json(usecase.execute(id, page.clamped()).await?))
}

// ── POST /assistants/{id}/doctors/attach ─────────────────────────────────────

#[derive(Deserialize)]
pub struct DoctorLinkRequest {
    pub doctor_id: Option<i64>,
}

pub async fn attach_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<DoctorLinkRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = AttachDoctorUseCase {
        repo: state.assistant_repo(),
        refs: state.refs(),
    };
    let assistant = usecase
        .execute(
            id,
            AttachDoctorInput {
                doctor_id: body.doctor_id,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Doctor attached to assistant", "assistant": assistant }),
    ))
}

// ── POST /assistants/{id}/doctors/detach ─────────────────────────────────────

pub async fn detach_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<DoctorLinkRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DetachDoctorUseCase {
        repo: state.assistant_repo(),
        refs: state.refs(),
    };
    let assistant = usecase
        .execute(
            id,
            AttachDoctorInput {
                doctor_id: body.doctor_id,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Doctor detached from assistant", "assistant": assistant }),
    ))
}
