use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        notification::{AnnounceRequest, NotificationListQuery},
    },
    routes::require_admin,
    services::notifications::{self, NotificationService},
    AppState,
};

pub async fn list_my(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Value>, AppError> {
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;
    let unread_only = query.unread.unwrap_or(false);

    let items = NotificationService::list_for_user(
        &state.db,
        user.user_id,
        unread_only,
        per_page,
        offset,
    )
    .await?;
    let unread = NotificationService::unread_count(&state.db, user.user_id).await?;

    Ok(Json(json!({
        "notifications": items,
        "page": page,
        "per_page": per_page,
        "unread_count": unread,
    })))
}

pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let count = NotificationService::unread_count(&state.db, user.user_id).await?;
    Ok(Json(json!({ "unread_count": count })))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    NotificationService::mark_read(&state.db, id, user.user_id, user.is_admin).await?;
    Ok(Json(json!({ "message": "Notification marked as read" })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let updated = NotificationService::mark_all_read(&state.db, user.user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    NotificationService::delete(&state.db, id, user.user_id, user.is_admin).await?;
    Ok(Json(json!({ "message": "Notification deleted" })))
}

/// Admin broadcast: explicit recipients, or every active user.
pub async fn announce(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<AnnounceRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    if body.title.trim().is_empty() || body.message.trim().is_empty() {
        return Err(AppError::Validation("Title and message are required".into()));
    }

    let recipients = match &body.recipient_ids {
        Some(ids) if !ids.is_empty() => ids.clone(),
        _ => NotificationService::all_active_recipients(&state.db).await?,
    };

    let payload = notifications::announcement(body.title.trim(), body.message.trim())
        .user(user.user_id);
    NotificationService::fan_out(&state.db, &recipients, &payload).await;

    Ok(Json(json!({ "recipients": recipients.len() })))
}
