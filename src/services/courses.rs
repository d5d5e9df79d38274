use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        collaboration::RequestStatus,
        course::{
            Course, CourseAccessRequest, CourseAccessRequestDetail, CourseDetail, CourseLesson,
            CourseSection, CreateCourseAccessRequest, CreateCourseRequest, CreateLessonRequest,
            CreateSectionRequest, SectionWithLessons, UpdateCourseRequest,
        },
        notification::NotificationKind,
    },
    services::{
        collaboration::ensure_pending,
        notifications::{self, NotificationService},
    },
};

pub struct CourseService;

impl CourseService {
    /// Published courses for everyone; admins and creators also see their
    /// unpublished ones.
    pub async fn list(pool: &PgPool, actor: &AuthenticatedUser) -> Result<Vec<Course>, AppError> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses
             WHERE is_published = TRUE OR created_by = $1 OR $2
             ORDER BY created_at DESC",
        )
        .bind(actor.user_id)
        .bind(actor.is_admin)
        .fetch_all(pool)
        .await?;
        Ok(courses)
    }

    pub async fn create(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        req: &CreateCourseRequest,
    ) -> Result<Course, AppError> {
        if req.title.trim().is_empty() {
            return Err(AppError::Validation("A title is required".into()));
        }

        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (title, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(req.title.trim())
        .bind(req.description.as_deref().unwrap_or(""))
        .bind(actor.user_id)
        .fetch_one(pool)
        .await?;

        let everyone = NotificationService::broadcast_recipients(pool, actor.user_id).await?;
        let payload = notifications::course_event(NotificationKind::CourseCreated, &course.title)
            .course(course.id)
            .user(actor.user_id);
        NotificationService::fan_out(pool, &everyone, &payload).await;

        Ok(course)
    }

    pub async fn detail(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> Result<CourseDetail, AppError> {
        let course = Self::fetch(pool, course_id).await?;
        if !course.is_published && course.created_by != actor.user_id && !actor.is_admin {
            return Err(AppError::Authorization(
                "Course is not published yet".into(),
            ));
        }

        let sections = sqlx::query_as::<_, CourseSection>(
            "SELECT * FROM course_sections WHERE course_id = $1 ORDER BY position, title",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        let lessons = sqlx::query_as::<_, CourseLesson>(
            "SELECT l.* FROM course_lessons l
             JOIN course_sections s ON s.id = l.section_id
             WHERE s.course_id = $1
             ORDER BY l.position, l.title",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;

        let sections = sections
            .into_iter()
            .map(|section| {
                let lessons = lessons
                    .iter()
                    .filter(|l| l.section_id == section.id)
                    .cloned()
                    .collect();
                SectionWithLessons { section, lessons }
            })
            .collect();

        Ok(CourseDetail { course, sections })
    }

    pub async fn update(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        course_id: Uuid,
        req: &UpdateCourseRequest,
    ) -> Result<Course, AppError> {
        Self::require_owner(pool, actor, course_id).await?;
        let course = sqlx::query_as::<_, Course>(
            "UPDATE courses
             SET title       = COALESCE($1, title),
                 description = COALESCE($2, description),
                 updated_at  = NOW()
             WHERE id = $3
             RETURNING *",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(course_id)
        .fetch_one(pool)
        .await?;
        Ok(course)
    }

    pub async fn publish(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> Result<Course, AppError> {
        Self::require_owner(pool, actor, course_id).await?;
        let course = Self::fetch(pool, course_id).await?;
        if course.is_published {
            return Err(AppError::Conflict("Course is already published".into()));
        }

        let course = sqlx::query_as::<_, Course>(
            "UPDATE courses SET is_published = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(course_id)
        .fetch_one(pool)
        .await?;

        let everyone = NotificationService::broadcast_recipients(pool, actor.user_id).await?;
        let payload = notifications::course_event(NotificationKind::CoursePublished, &course.title)
            .course(course.id)
            .user(actor.user_id);
        NotificationService::fan_out(pool, &everyone, &payload).await;

        Ok(course)
    }

    pub async fn delete(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> Result<(), AppError> {
        Self::require_owner(pool, actor, course_id).await?;
        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn add_section(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        course_id: Uuid,
        req: &CreateSectionRequest,
    ) -> Result<CourseSection, AppError> {
        Self::require_owner(pool, actor, course_id).await?;
        let section = sqlx::query_as::<_, CourseSection>(
            "INSERT INTO course_sections (course_id, title, position)
             VALUES ($1, $2, COALESCE($3,
                 (SELECT COALESCE(MAX(position) + 1, 0) FROM course_sections WHERE course_id = $1)))
             RETURNING *",
        )
        .bind(course_id)
        .bind(req.title.trim())
        .bind(req.position)
        .fetch_one(pool)
        .await?;
        Ok(section)
    }

    pub async fn add_lesson(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        section_id: Uuid,
        req: &CreateLessonRequest,
    ) -> Result<CourseLesson, AppError> {
        let course_id: Option<Uuid> =
            sqlx::query_scalar("SELECT course_id FROM course_sections WHERE id = $1")
                .bind(section_id)
                .fetch_optional(pool)
                .await?;
        let course_id = course_id.ok_or_else(|| AppError::NotFound("Section not found".into()))?;
        Self::require_owner(pool, actor, course_id).await?;

        let lesson = sqlx::query_as::<_, CourseLesson>(
            "INSERT INTO course_lessons (section_id, title, content, position)
             VALUES ($1, $2, $3, COALESCE($4,
                 (SELECT COALESCE(MAX(position) + 1, 0) FROM course_lessons WHERE section_id = $1)))
             RETURNING *",
        )
        .bind(section_id)
        .bind(req.title.trim())
        .bind(req.content.as_deref().unwrap_or(""))
        .bind(req.position)
        .fetch_one(pool)
        .await?;
        Ok(lesson)
    }

    pub async fn complete_lesson(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        lesson_id: Uuid,
    ) -> Result<(), AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM course_lessons WHERE id = $1)")
                .bind(lesson_id)
                .fetch_one(pool)
                .await?;
        if !exists {
            return Err(AppError::NotFound("Lesson not found".into()));
        }

        sqlx::query(
            "INSERT INTO lesson_progress (user_id, lesson_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, lesson_id) DO NOTHING",
        )
        .bind(actor.user_id)
        .bind(lesson_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    // ----- access requests -----

    /// One request per (user, course), ever — a rejected request cannot be
    /// re-filed, unlike collaboration requests.
    pub async fn request_access(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        course_id: Uuid,
        req: &CreateCourseAccessRequest,
    ) -> Result<CourseAccessRequest, AppError> {
        if req.request_reason.trim().is_empty() {
            return Err(AppError::Validation("A reason is required".into()));
        }
        let course = Self::fetch(pool, course_id).await?;

        let request = sqlx::query_as::<_, CourseAccessRequest>(
            "INSERT INTO course_access_requests (user_id, course_id, request_reason)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(actor.user_id)
        .bind(course_id)
        .bind(req.request_reason.trim())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            match e.as_database_error().and_then(|db| db.constraint()) {
                Some("course_access_requests_user_id_course_id_key") => AppError::Conflict(
                    "You have already requested access to this course".into(),
                ),
                _ => AppError::Database(e),
            }
        })?;

        let requester_name = NotificationService::user_name(pool, actor.user_id).await;
        let admins = NotificationService::admin_recipients(pool).await?;
        let payload = notifications::course_access_created(&requester_name, &course.title)
            .course(course_id)
            .user(actor.user_id)
            .request(request.id);
        NotificationService::fan_out(pool, &admins, &payload).await;

        Ok(request)
    }

    pub async fn list_access_all(
        pool: &PgPool,
    ) -> Result<Vec<CourseAccessRequestDetail>, AppError> {
        let rows = sqlx::query_as::<_, CourseAccessRequestDetail>(
            "SELECT r.id, r.user_id,
                    CONCAT(u.first_name, ' ', u.last_name) AS requester_name,
                    r.course_id, c.title AS course_title,
                    r.status, r.request_reason, r.admin_response, r.created_at
             FROM course_access_requests r
             JOIN users u ON u.id = r.user_id
             JOIN courses c ON c.id = r.course_id
             ORDER BY r.created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_access_mine(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<CourseAccessRequest>, AppError> {
        let rows = sqlx::query_as::<_, CourseAccessRequest>(
            "SELECT * FROM course_access_requests
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn respond_access(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        request_id: Uuid,
        decision: RequestStatus,
        admin_response: Option<String>,
    ) -> Result<CourseAccessRequest, AppError> {
        if decision == RequestStatus::Pending {
            return Err(AppError::Validation(
                "Status must be approved or rejected".into(),
            ));
        }

        let request = sqlx::query_as::<_, CourseAccessRequest>(
            "SELECT * FROM course_access_requests WHERE id = $1",
        )
        .bind(request_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Course access request not found".into()))?;

        let current: RequestStatus = request
            .status
            .parse()
            .map_err(|_| AppError::Internal(format!("Corrupt request status: {}", request.status)))?;
        ensure_pending(current)?;

        let updated = sqlx::query_as::<_, CourseAccessRequest>(
            "UPDATE course_access_requests
             SET status = $1, admin_response = $2, responded_by = $3, responded_at = $4
             WHERE id = $5
             RETURNING *",
        )
        .bind(decision.to_string())
        .bind(&admin_response)
        .bind(actor.user_id)
        .bind(Utc::now())
        .bind(request_id)
        .fetch_one(pool)
        .await?;

        let responder_name = NotificationService::user_name(pool, actor.user_id).await;
        let course_title: Option<String> =
            sqlx::query_scalar("SELECT title FROM courses WHERE id = $1")
                .bind(request.course_id)
                .fetch_optional(pool)
                .await?;
        let course_title = course_title.unwrap_or_else(|| "Unknown".to_string());
        let payload = notifications::course_access_resolved(
            decision == RequestStatus::Approved,
            &responder_name,
            &course_title,
            admin_response.as_deref(),
        )
        .course(request.course_id)
        .user(actor.user_id)
        .request(request.id);
        NotificationService::fan_out(pool, &[request.user_id], &payload).await;

        Ok(updated)
    }

    async fn fetch(pool: &PgPool, course_id: Uuid) -> Result<Course, AppError> {
        let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".into()))?;
        Ok(course)
    }

    async fn require_owner(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> Result<(), AppError> {
        let created_by: Option<Uuid> =
            sqlx::query_scalar("SELECT created_by FROM courses WHERE id = $1")
                .bind(course_id)
                .fetch_optional(pool)
                .await?;
        let created_by =
            created_by.ok_or_else(|| AppError::NotFound("Course not found".into()))?;
        if created_by != actor.user_id && !actor.is_admin {
            return Err(AppError::Authorization(
                "Only the course creator or an admin may modify it".into(),
            ));
        }
        Ok(())
    }
}
