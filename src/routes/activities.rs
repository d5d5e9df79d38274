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
        activity::{CreateActivityRequest, UpdateActivityRequest},
        auth::AuthenticatedUser,
        user::Role,
    },
    routes::require_role,
    services::activities::ActivityService,
    AppState,
};

pub async fn list_activities(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let activities = ActivityService::list(&state.db).await?;
    Ok(Json(serde_json::to_value(activities).unwrap()))
}

pub async fn create_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateActivityRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, Role::SpecialistEducator)?;
    let activity = ActivityService::create(&state.db, &user, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(activity).unwrap())))
}

pub async fn update_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateActivityRequest>,
) -> Result<Json<Value>, AppError> {
    let activity = ActivityService::update(&state.db, &user, id, &body).await?;
    Ok(Json(serde_json::to_value(activity).unwrap()))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    ActivityService::delete(&state.db, &user, id).await?;
    Ok(Json(json!({ "message": "Activity deleted" })))
}
