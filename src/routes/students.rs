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
        student::{AssignUsersRequest, CreateStudentRequest, UpdateStudentRequest},
        user::Role,
    },
    routes::require_admin,
    services::{access::AccessService, students::StudentService},
    AppState,
};

/// Admin and ministry staff see every student; everyone else sees the
/// students they are assigned to or created. List access for ministry staff
/// is intentionally broader than collaboration access.
pub async fn list_students(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let students = if user.is_admin || user.role == Role::MinistryStaff {
        StudentService::list(&state.db).await?
    } else {
        StudentService::list_for_user(&state.db, user.user_id).await?
    };
    Ok(Json(serde_json::to_value(students).unwrap()))
}

pub async fn create_student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if user.role == Role::MinistryStaff {
        return Err(AppError::Authorization(
            "Ministry staff may not create students".into(),
        ));
    }
    if body.first_name.trim().is_empty() || body.last_name.trim().is_empty() {
        return Err(AppError::Validation("First and last name are required".into()));
    }

    let student = StudentService::create(&state.db, &user, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(student).unwrap())))
}

pub async fn get_student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    AccessService::require_access(&state.db, &user, id).await?;
    let student = StudentService::get_with_team(&state.db, id).await?;
    Ok(Json(serde_json::to_value(student).unwrap()))
}

pub async fn update_student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStudentRequest>,
) -> Result<Json<Value>, AppError> {
    AccessService::require_access(&state.db, &user, id).await?;
    let student = StudentService::update(&state.db, id, &body).await?;
    Ok(Json(serde_json::to_value(student).unwrap()))
}

pub async fn assign_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignUsersRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    if body.user_ids.is_empty() {
        return Err(AppError::Validation("user_ids must not be empty".into()));
    }
    let student = StudentService::assign_users(&state.db, &user, id, &body.user_ids).await?;
    Ok(Json(serde_json::to_value(student).unwrap()))
}

/// Parents only — not even admins claim students this way.
pub async fn assign_self(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if user.role != Role::Parent {
        return Err(AppError::Authorization(
            "Only parents may claim a student".into(),
        ));
    }
    let student = StudentService::assign_self(&state.db, &user, id).await?;
    Ok(Json(serde_json::to_value(student).unwrap()))
}
