use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{auth::AuthenticatedUser, message::CreateMessageRequest},
    services::messages::MessageService,
    AppState,
};

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

pub async fn send_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let msg = MessageService::send(&state.db, user.user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(msg).unwrap())))
}

pub async fn get_conversations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let items = MessageService::get_conversations(&state.db, user.user_id).await?;
    Ok(Json(serde_json::to_value(items).unwrap()))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(partner_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>, AppError> {
    let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let msgs =
        MessageService::get_conversation(&state.db, user.user_id, partner_id, per_page, offset)
            .await?;
    Ok(Json(serde_json::to_value(msgs).unwrap()))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    MessageService::mark_read(&state.db, id, user.user_id).await?;
    Ok(Json(json!({ "message": "Message marked as read" })))
}
