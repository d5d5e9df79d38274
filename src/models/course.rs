use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_by: Uuid,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseSection {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseLesson {
    pub id: Uuid,
    pub section_id: Uuid,
    pub title: String,
    pub content: String,
    pub position: i32,
}

/// Section with its lessons, as returned by the course detail endpoint.
#[derive(Debug, Serialize)]
pub struct SectionWithLessons {
    #[serde(flatten)]
    pub section: CourseSection,
    pub lessons: Vec<CourseLesson>,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub sections: Vec<SectionWithLessons>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseAccessRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub request_reason: String,
    pub admin_response: Option<String>,
    pub responded_by: Option<Uuid>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Admin listing row with requester and course joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseAccessRequestDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub requester_name: String,
    pub course_id: Uuid,
    pub course_title: String,
    pub status: String,
    pub request_reason: String,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSectionRequest {
    pub title: String,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLessonRequest {
    pub title: String,
    pub content: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseAccessRequest {
    pub request_reason: String,
}
