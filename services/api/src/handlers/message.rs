use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use medworld_core::serde::double_option;
use medworld_domain::pagination::{BulkPageRequest, Page, PageRequest};

use crate::domain::types::MessageView;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::message::{
    DeleteMessageUseCase, GetConversationUseCase, GetMessageUseCase, GetMessagesByUserUseCase,
    ListMessagesUseCase, MarkMessageSeenUseCase, SendMessageInput, SendMessageUseCase,
    UpdateMessageInput, UpdateMessageUseCase,
};

// ── GET /messages ────────────────────────────────────────────────────────────

pub async fn list_messages(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<MessageView>>, ApiError> {
    let usecase = ListMessagesUseCase {
        repo: state.message_repo(),
    };
    Ok(Json(usecase.execute(page.clamped()).await?))
}

// ── GET /messages/{id} ───────────────────────────────────────────────────────

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageView>, ApiError> {
    let usecase = GetMessageUseCase {
        repo: state.message_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /messages ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub cabinet_id: Option<i64>,
    pub date: Option<String>,
    pub content: Option<Value>,
    pub status: Option<String>,
    pub attachments: Option<Value>,
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = SendMessageUseCase {
        repo: state.message_repo(),
        refs: state.refs(),
    };
    let message = usecase
        .execute(SendMessageInput {
            sender_id: body.sender_id,
            receiver_id: body.receiver_id,
            cabinet_id: body.cabinet_id,
            date: body.date,
            content: body.content,
            status: body.status,
            attachments: body.attachments,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Message created successfully", "data": message })),
    ))
}

// ── PUT /messages/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMessageRequest {
    pub content: Option<Value>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub attachments: Option<Option<Value>>,
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateMessageRequest>,
) -> Result<Json<Value>, ApiError> {
    let usecase = UpdateMessageUseCase {
        repo: state.message_repo(),
    };
    let message = usecase
        .execute(
            id,
            UpdateMessageInput {
                content: body.content,
                status: body.status,
                attachments: body.attachments,
            },
        )
        .await?;
    Ok(Json(
        json!({ "message": "Message updated successfully", "data": message }),
    ))
}

// ── DELETE /messages/{id} ────────────────────────────────────────────────────

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = DeleteMessageUseCase {
        repo: state.message_repo(),
    };
    usecase.execute(id).await?;
    Ok(Json(json!({ "message": "Message deleted successfully" })))
}

// ── POST /messages/{id}/mark-seen ────────────────────────────────────────────

pub async fn mark_message_seen(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let usecase = MarkMessageSeenUseCase {
        repo: state.message_repo(),
    };
    let message = usecase.execute(id).await?;
    Ok(Json(
        json!({ "message": "Message marked as seen", "data": message }),
    ))
}

// ── GET /messages/conversation/{user_a}/{user_b} ─────────────────────────────

pub async fn get_conversation(
    State(state): State<AppState>,
    Path((user_a, user_b)): Path<(i64, i64)>,
    Query(page): Query<BulkPageRequest>,
) -> Result<Json<Page<MessageView>>, ApiError> {
    let usecase = GetConversationUseCase {
        repo: state.message_repo(),
    };
    Ok(Json(usecase.execute(user_a, user_b, page.clamped()).await?))
}

// ── GET /messages/user/{user_id} ─────────────────────────────────────────────

pub async fn get_user_messages(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<MessageView>>, ApiError> {
    let usecase = GetMessagesByUserUseCase {
        repo: state.message_repo(),
    };
    Ok(Json(usecase.execute(user_id, page.clamped()).await?))
}
