use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;

use crate::{
    error::AppError,
    models::auth::{AuthenticatedUser, LoginRequest, RegisterRequest},
    models::user::UserProfile,
    services::auth::AuthService,
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let response = AuthService::register(&state.db, &state.config, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(response).unwrap())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let response = AuthService::login(&state.db, &state.config, &body).await?;
    Ok(Json(serde_json::to_value(response).unwrap()))
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let profile: UserProfile = AuthService::profile(&state.db, user.user_id).await?.into();
    Ok(Json(serde_json::to_value(profile).unwrap()))
}
