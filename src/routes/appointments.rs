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
        appointment::{CreateAppointmentRequest, UpdateAppointmentRequest},
        auth::AuthenticatedUser,
    },
    services::{access::AccessService, appointments::AppointmentService},
    AppState,
};

pub async fn list_appointments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    AccessService::require_access(&state.db, &user, student_id).await?;
    let appointments = AppointmentService::list_for_student(&state.db, student_id).await?;
    Ok(Json(serde_json::to_value(appointments).unwrap()))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    AccessService::require_access(&state.db, &user, student_id).await?;
    let appointment = AppointmentService::create(&state.db, &user, student_id, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(appointment).unwrap()),
    ))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = AppointmentService::update(&state.db, &user, id, &body).await?;
    Ok(Json(serde_json::to_value(appointment).unwrap()))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    AppointmentService::delete(&state.db, &user, id).await?;
    Ok(Json(json!({ "message": "Appointment deleted" })))
}
