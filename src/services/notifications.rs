use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::notification::{Notification, NotificationKind},
};

/// One notification's content plus its back-references, fanned out to any
/// number of recipients.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub related_student_id: Option<Uuid>,
    pub related_user_id: Option<Uuid>,
    pub related_course_id: Option<Uuid>,
    pub related_request_id: Option<Uuid>,
}

impl NotificationPayload {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            data: None,
            related_student_id: None,
            related_user_id: None,
            related_course_id: None,
            related_request_id: None,
        }
    }

    pub fn student(mut self, id: Uuid) -> Self {
        self.related_student_id = Some(id);
        self
    }

    pub fn user(mut self, id: Uuid) -> Self {
        self.related_user_id = Some(id);
        self
    }

    pub fn course(mut self, id: Uuid) -> Self {
        self.related_course_id = Some(id);
        self
    }

    pub fn request(mut self, id: Uuid) -> Self {
        self.related_request_id = Some(id);
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

pub struct NotificationService;

impl NotificationService {
    /// Write one notification row per recipient, sequentially. A failed
    /// insert is logged and skipped — the remaining recipients still get
    /// theirs. Delivery is best-effort; callers never fail on fan-out.
    pub async fn fan_out(pool: &PgPool, recipients: &[Uuid], payload: &NotificationPayload) {
        for recipient in recipients {
            if let Err(e) = Self::insert(pool, *recipient, payload).await {
                tracing::warn!(
                    "notification insert failed for recipient {}: {}",
                    recipient,
                    e
                );
            }
        }
    }

    async fn insert(
        pool: &PgPool,
        recipient_id: Uuid,
        payload: &NotificationPayload,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO notifications
                (recipient_id, kind, title, message, data,
                 related_student_id, related_user_id, related_course_id, related_request_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(recipient_id)
        .bind(payload.kind.to_string())
        .bind(&payload.title)
        .bind(&payload.message)
        .bind(&payload.data)
        .bind(payload.related_student_id)
        .bind(payload.related_user_id)
        .bind(payload.related_course_id)
        .bind(payload.related_request_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// All active admin accounts (in practice one, by invariant).
    pub async fn admin_recipients(pool: &PgPool) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar(
            "SELECT id FROM users WHERE is_admin = TRUE AND is_active = TRUE",
        )
        .fetch_all(pool)
        .await?;
        Ok(ids)
    }

    /// Every active user except the actor — used for course broadcasts.
    pub async fn broadcast_recipients(pool: &PgPool, except: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar(
            "SELECT id FROM users WHERE is_active = TRUE AND id <> $1",
        )
        .bind(except)
        .fetch_all(pool)
        .await?;
        Ok(ids)
    }

    pub async fn all_active_recipients(pool: &PgPool) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar("SELECT id FROM users WHERE is_active = TRUE")
            .fetch_all(pool)
            .await?;
        Ok(ids)
    }

    /// The student's current care team, creator included via its assignment row.
    pub async fn team_recipients(pool: &PgPool, student_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar(
            "SELECT user_id FROM student_assignments WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;
        Ok(ids)
    }

    /// Display name for message templates; missing users render as "Unknown".
    pub async fn user_name(pool: &PgPool, user_id: Uuid) -> String {
        let name: Option<(String, String)> =
            sqlx::query_as("SELECT first_name, last_name FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await
                .unwrap_or(None);
        match name {
            Some((first, last)) => format!("{first} {last}"),
            None => "Unknown".to_string(),
        }
    }

    pub async fn student_name(pool: &PgPool, student_id: Uuid) -> String {
        let name: Option<(String, String)> =
            sqlx::query_as("SELECT first_name, last_name FROM students WHERE id = $1")
                .bind(student_id)
                .fetch_optional(pool)
                .await
                .unwrap_or(None);
        match name {
            Some((first, last)) => format!("{first} {last}"),
            None => "Unknown".to_string(),
        }
    }

    // ----- inbox operations -----

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        unread_only: bool,
        per_page: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, AppError> {
        let rows = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications
             WHERE recipient_id = $1 AND (NOT $2 OR read = FALSE)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Recipient or admin only.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<(), AppError> {
        let updated = sqlx::query(
            "UPDATE notifications SET read = TRUE
             WHERE id = $1 AND (recipient_id = $2 OR $3)",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(is_admin)
        .execute(pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification not found".into()));
        }
        Ok(())
    }

    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, AppError> {
        let updated = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE recipient_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(updated.rows_affected())
    }

    pub async fn delete(
        pool: &PgPool,
        notification_id: Uuid,
        user_id: Uuid,
        is_admin: bool,
    ) -> Result<(), AppError> {
        let deleted = sqlx::query(
            "DELETE FROM notifications WHERE id = $1 AND (recipient_id = $2 OR $3)",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(is_admin)
        .execute(pool)
        .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification not found".into()));
        }
        Ok(())
    }
}

// ----- message templates -----
//
// Pure builders so the wording stays in one place and unit-testable.

pub fn request_created(requester: &str, student: &str) -> NotificationPayload {
    NotificationPayload::new(
        NotificationKind::CollaborationRequestCreated,
        "New collaboration request",
        format!("{requester} requested access to {student}'s records"),
    )
}

pub fn request_approved(approver: &str, student: &str) -> NotificationPayload {
    NotificationPayload::new(
        NotificationKind::CollaborationRequestApproved,
        "Collaboration request approved",
        format!("{approver} approved your request to collaborate on {student}"),
    )
}

pub fn request_rejected(student: &str, admin_response: Option<&str>) -> NotificationPayload {
    let message = match admin_response {
        Some(response) => format!(
            "Your request to collaborate on {student} was rejected: {response}"
        ),
        None => format!("Your request to collaborate on {student} was rejected"),
    };
    NotificationPayload::new(
        NotificationKind::CollaborationRequestRejected,
        "Collaboration request rejected",
        message,
    )
}

pub fn record_added(kind: NotificationKind, author: &str, student: &str) -> NotificationPayload {
    let (title, noun) = match kind {
        NotificationKind::AppointmentAdded => ("New appointment", "an appointment"),
        NotificationKind::ProgressReportAdded => ("New progress report", "a progress report"),
        _ => ("New note", "a note"),
    };
    NotificationPayload::new(
        kind,
        title,
        format!("{author} added {noun} for {student}"),
    )
}

pub fn student_assigned(assigner: &str, student: &str) -> NotificationPayload {
    NotificationPayload::new(
        NotificationKind::StudentAssigned,
        "Student assigned to you",
        format!("{assigner} assigned {student} to you"),
    )
}

pub fn team_member_added(new_members: &[String], student: &str) -> NotificationPayload {
    NotificationPayload::new(
        NotificationKind::TeamMemberAdded,
        "Care team updated",
        format!(
            "{} joined {student}'s care team",
            new_members.join(", ")
        ),
    )
}

pub fn course_event(kind: NotificationKind, course_title: &str) -> NotificationPayload {
    let (title, message) = match kind {
        NotificationKind::CoursePublished => (
            "Course published",
            format!("The course \"{course_title}\" is now available"),
        ),
        _ => (
            "New course",
            format!("A new course \"{course_title}\" was created"),
        ),
    };
    NotificationPayload::new(kind, title, message)
}

pub fn course_access_created(requester: &str, course_title: &str) -> NotificationPayload {
    NotificationPayload::new(
        NotificationKind::CourseAccessRequestCreated,
        "New course access request",
        format!("{requester} requested access to the course \"{course_title}\""),
    )
}

pub fn course_access_resolved(
    approved: bool,
    responder: &str,
    course_title: &str,
    admin_response: Option<&str>,
) -> NotificationPayload {
    let kind = if approved {
        NotificationKind::CourseAccessRequestApproved
    } else {
        NotificationKind::CourseAccessRequestRejected
    };
    let verdict = if approved { "approved" } else { "rejected" };
    let mut message =
        format!("{responder} {verdict} your access request for \"{course_title}\"");
    if let Some(response) = admin_response {
        message.push_str(&format!(": {response}"));
    }
    let title = if approved {
        "Course access approved"
    } else {
        "Course access rejected"
    };
    NotificationPayload::new(kind, title, message)
}

pub fn announcement(title: &str, message: &str) -> NotificationPayload {
    NotificationPayload::new(NotificationKind::SystemAnnouncement, title, message)
        .data(json!({ "source": "announcement" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_created_embeds_both_names() {
        let p = request_created("Dana Roy", "Sam Tremblay");
        assert_eq!(p.kind, NotificationKind::CollaborationRequestCreated);
        assert!(p.message.contains("Dana Roy"));
        assert!(p.message.contains("Sam Tremblay"));
    }

    #[test]
    fn request_rejected_includes_response_when_present() {
        let with = request_rejected("Sam", Some("insufficient justification"));
        assert!(with.message.contains("insufficient justification"));
        let without = request_rejected("Sam", None);
        assert!(!without.message.contains(':'));
        assert_eq!(without.kind, NotificationKind::CollaborationRequestRejected);
    }

    #[test]
    fn record_added_picks_template_per_kind() {
        let note = record_added(NotificationKind::NoteAdded, "Dr. Lee", "Sam");
        assert!(note.message.contains("a note"));
        let appt = record_added(NotificationKind::AppointmentAdded, "Dr. Lee", "Sam");
        assert!(appt.message.contains("an appointment"));
        assert_eq!(appt.kind, NotificationKind::AppointmentAdded);
        let report = record_added(NotificationKind::ProgressReportAdded, "Dr. Lee", "Sam");
        assert!(report.message.contains("a progress report"));
    }

    #[test]
    fn team_member_added_joins_names_with_commas() {
        let p = team_member_added(
            &["Ana Silva".to_string(), "Omar Khan".to_string()],
            "Sam",
        );
        assert!(p.message.contains("Ana Silva, Omar Khan"));
    }

    #[test]
    fn course_access_resolution_embeds_responder_and_reason() {
        let p = course_access_resolved(false, "Marie", "Reading 101", Some("full"));
        assert_eq!(p.kind, NotificationKind::CourseAccessRequestRejected);
        assert!(p.message.contains("Marie"));
        assert!(p.message.contains("full"));
        let ok = course_access_resolved(true, "Marie", "Reading 101", None);
        assert_eq!(ok.kind, NotificationKind::CourseAccessRequestApproved);
        assert!(ok.message.contains("approved"));
    }
}
