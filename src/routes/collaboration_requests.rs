use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        collaboration::{CreateCollaborationRequest, UpdateRequestStatus},
    },
    routes::require_admin,
    services::{access::AccessService, collaboration::CollaborationService},
    AppState,
};

pub async fn create_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCollaborationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = CollaborationService::create(&state.db, &user, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(request).unwrap())))
}

pub async fn list_all(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let requests = CollaborationService::list_all(&state.db).await?;
    Ok(Json(serde_json::to_value(requests).unwrap()))
}

pub async fn list_mine(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let requests = CollaborationService::list_mine(&state.db, user.user_id).await?;
    Ok(Json(serde_json::to_value(requests).unwrap()))
}

pub async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRequestStatus>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let request =
        CollaborationService::update_status(&state.db, &user, id, body.status, body.admin_response)
            .await?;
    Ok(Json(serde_json::to_value(request).unwrap()))
}

/// Why the caller can or cannot collaborate on this student — consumed by
/// the UI to render the request button state.
pub async fn access_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let status = AccessService::access_status(&state.db, &user, student_id).await?;
    Ok(Json(serde_json::to_value(status).unwrap()))
}
