use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{auth::AuthenticatedUser, user::UpdateUserRequest},
    routes::require_admin,
    services::users::UserService,
    AppState,
};

pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let users = UserService::list(&state.db).await?;
    Ok(Json(serde_json::to_value(users).unwrap()))
}

pub async fn list_professionals(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let users = UserService::list_professionals(&state.db).await?;
    Ok(Json(serde_json::to_value(users).unwrap()))
}

pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(target_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let updated = UserService::update(&state.db, target_id, &body).await?;
    Ok(Json(serde_json::to_value(updated).unwrap()))
}
