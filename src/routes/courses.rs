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
        collaboration::UpdateRequestStatus,
        course::{
            CreateCourseAccessRequest, CreateCourseRequest, CreateLessonRequest,
            CreateSectionRequest, UpdateCourseRequest,
        },
        user::Role,
    },
    routes::{require_admin, require_role},
    services::courses::CourseService,
    AppState,
};

pub async fn list_courses(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let courses = CourseService::list(&state.db, &user).await?;
    Ok(Json(serde_json::to_value(courses).unwrap()))
}

pub async fn create_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, Role::SpecialistEducator)?;
    let course = CourseService::create(&state.db, &user, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(course).unwrap())))
}

pub async fn get_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let course = CourseService::detail(&state.db, &user, id).await?;
    Ok(Json(serde_json::to_value(course).unwrap()))
}

pub async fn update_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCourseRequest>,
) -> Result<Json<Value>, AppError> {
    let course = CourseService::update(&state.db, &user, id, &body).await?;
    Ok(Json(serde_json::to_value(course).unwrap()))
}

pub async fn publish_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let course = CourseService::publish(&state.db, &user, id).await?;
    Ok(Json(serde_json::to_value(course).unwrap()))
}

pub async fn delete_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    CourseService::delete(&state.db, &user, id).await?;
    Ok(Json(json!({ "message": "Course deleted" })))
}

pub async fn add_section(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateSectionRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let section = CourseService::add_section(&state.db, &user, id, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(section).unwrap())))
}

pub async fn add_lesson(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(section_id): Path<Uuid>,
    Json(body): Json<CreateLessonRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let lesson = CourseService::add_lesson(&state.db, &user, section_id, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(lesson).unwrap())))
}

pub async fn complete_lesson(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    CourseService::complete_lesson(&state.db, &user, lesson_id).await?;
    Ok(Json(json!({ "message": "Lesson completed" })))
}

pub async fn request_access(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(course_id): Path<Uuid>,
    Json(body): Json<CreateCourseAccessRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = CourseService::request_access(&state.db, &user, course_id, &body).await?;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(request).unwrap())))
}

pub async fn list_access_all(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let requests = CourseService::list_access_all(&state.db).await?;
    Ok(Json(serde_json::to_value(requests).unwrap()))
}

pub async fn list_access_mine(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let requests = CourseService::list_access_mine(&state.db, user.user_id).await?;
    Ok(Json(serde_json::to_value(requests).unwrap()))
}

pub async fn respond_access(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRequestStatus>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;
    let request =
        CourseService::respond_access(&state.db, &user, id, body.status, body.admin_response)
            .await?;
    Ok(Json(serde_json::to_value(request).unwrap()))
}
