use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        note::{CreateNoteRequest, Note, UpdateNoteRequest},
        notification::NotificationKind,
    },
    services::notifications::{self, NotificationService},
};

pub struct NoteService;

impl NoteService {
    pub async fn list_for_student(pool: &PgPool, student_id: Uuid) -> Result<Vec<Note>, AppError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE student_id = $1 ORDER BY created_at DESC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;
        Ok(notes)
    }

    /// Caller must already have passed the access evaluator. The whole care
    /// team, creator included, is notified.
    pub async fn create(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        student_id: Uuid,
        req: &CreateNoteRequest,
    ) -> Result<Note, AppError> {
        if req.title.trim().is_empty() || req.content.trim().is_empty() {
            return Err(AppError::Validation("Title and content are required".into()));
        }

        let note = sqlx::query_as::<_, Note>(
            "INSERT INTO notes (student_id, created_by, title, content, category)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(student_id)
        .bind(actor.user_id)
        .bind(req.title.trim())
        .bind(&req.content)
        .bind(&req.category)
        .fetch_one(pool)
        .await?;

        let author = NotificationService::user_name(pool, actor.user_id).await;
        let student = NotificationService::student_name(pool, student_id).await;
        let team = NotificationService::team_recipients(pool, student_id).await?;
        let payload = notifications::record_added(NotificationKind::NoteAdded, &author, &student)
            .student(student_id)
            .user(actor.user_id);
        NotificationService::fan_out(pool, &team, &payload).await;

        Ok(note)
    }

    /// Creator or admin only.
    pub async fn update(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        note_id: Uuid,
        req: &UpdateNoteRequest,
    ) -> Result<Note, AppError> {
        Self::require_owner(pool, actor, note_id).await?;
        let note = sqlx::query_as::<_, Note>(
            "UPDATE notes
             SET title    = COALESCE($1, title),
                 content  = COALESCE($2, content),
                 category = COALESCE($3, category),
                 updated_at = NOW()
             WHERE id = $4
             RETURNING *",
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(&req.category)
        .bind(note_id)
        .fetch_one(pool)
        .await?;
        Ok(note)
    }

    pub async fn delete(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        note_id: Uuid,
    ) -> Result<(), AppError> {
        Self::require_owner(pool, actor, note_id).await?;
        sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(note_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn require_owner(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        note_id: Uuid,
    ) -> Result<(), AppError> {
        let created_by: Option<Uuid> =
            sqlx::query_scalar("SELECT created_by FROM notes WHERE id = $1")
                .bind(note_id)
                .fetch_optional(pool)
                .await?;
        let created_by = created_by.ok_or_else(|| AppError::NotFound("Note not found".into()))?;
        if created_by != actor.user_id && !actor.is_admin {
            return Err(AppError::Authorization(
                "Only the author or an admin may modify this note".into(),
            ));
        }
        Ok(())
    }
}
