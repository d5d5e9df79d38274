use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        note::{CreateNoteRequest, UpdateNoteRequest},
    },
    services::{access::AccessService, notes::NoteService},
    AppState,
};

pub async fn list_notes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    AccessService::require_access(&state.db, &user, student_id).await?;
    let notes = NoteService::list_for_student(&state.db, student_id).await?;
    Ok(Json(serde_json::to_value(notes).unwrap()))
}

pub async fn create_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
    Json(body): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    AccessService::require_access(&state.db, &user, student_id).await?;
    let note = NoteService::create(&state.db, &user, student_id, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(note).unwrap())))
}

pub async fn update_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNoteRequest>,
) -> Result<Json<Value>, AppError> {
    let note = NoteService::update(&state.db, &user, id, &body).await?;
    Ok(Json(serde_json::to_value(note).unwrap()))
}

pub async fn delete_note(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    NoteService::delete(&state.db, &user, id).await?;
    Ok(Json(json!({ "message": "Note deleted" })))
}
