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
    models::{
        auth::AuthenticatedUser,
        post::{CreatePostRequest, UpdatePostRequest},
    },
    services::posts::PostService,
    AppState,
};

#[derive(Deserialize)]
pub struct FeedQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Value>, AppError> {
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let posts = PostService::list(&state.db, per_page, offset).await?;
    Ok(Json(serde_json::to_value(posts).unwrap()))
}

pub async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let post = PostService::create(&state.db, &user, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(post).unwrap())))
}

pub async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<Value>, AppError> {
    let post = PostService::update(&state.db, &user, id, &body).await?;
    Ok(Json(serde_json::to_value(post).unwrap()))
}

pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    PostService::delete(&state.db, &user, id).await?;
    Ok(Json(json!({ "message": "Post deleted" })))
}
