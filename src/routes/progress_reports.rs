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
        progress_report::{CreateProgressReportRequest, UpdateProgressReportRequest},
    },
    services::{access::AccessService, progress_reports::ProgressReportService},
    AppState,
};

pub async fn list_reports(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    AccessService::require_access(&state.db, &user, student_id).await?;
    let reports = ProgressReportService::list_for_student(&state.db, student_id).await?;
    Ok(Json(serde_json::to_value(reports).unwrap()))
}

pub async fn create_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
    Json(body): Json<CreateProgressReportRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    AccessService::require_access(&state.db, &user, student_id).await?;
    let report = ProgressReportService::create(&state.db, &user, student_id, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(report).unwrap())))
}

pub async fn update_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProgressReportRequest>,
) -> Result<Json<Value>, AppError> {
    let report = ProgressReportService::update(&state.db, &user, id, &body).await?;
    Ok(Json(serde_json::to_value(report).unwrap()))
}

pub async fn delete_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    ProgressReportService::delete(&state.db, &user, id).await?;
    Ok(Json(json!({ "message": "Progress report deleted" })))
}
