use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Closed set of notification event kinds. The wire strings are part of the
/// API contract consumed by the frontend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CollaborationRequestCreated,
    CollaborationRequestApproved,
    CollaborationRequestRejected,
    NoteAdded,
    AppointmentAdded,
    ProgressReportAdded,
    StudentAssigned,
    StudentUnassigned,
    TeamMemberAdded,
    CourseCreated,
    CoursePublished,
    CourseAccessRequestCreated,
    CourseAccessRequestApproved,
    CourseAccessRequestRejected,
    SystemAnnouncement,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NotificationKind::CollaborationRequestCreated => "collaboration_request_created",
            NotificationKind::CollaborationRequestApproved => "collaboration_request_approved",
            NotificationKind::CollaborationRequestRejected => "collaboration_request_rejected",
            NotificationKind::NoteAdded => "note_added",
            NotificationKind::AppointmentAdded => "appointment_added",
            NotificationKind::ProgressReportAdded => "progress_report_added",
            NotificationKind::StudentAssigned => "student_assigned",
            NotificationKind::StudentUnassigned => "student_unassigned",
            NotificationKind::TeamMemberAdded => "team_member_added",
            NotificationKind::CourseCreated => "course_created",
            NotificationKind::CoursePublished => "course_published",
            NotificationKind::CourseAccessRequestCreated => "course_access_request_created",
            NotificationKind::CourseAccessRequestApproved => "course_access_request_approved",
            NotificationKind::CourseAccessRequestRejected => "course_access_request_rejected",
            NotificationKind::SystemAnnouncement => "system_announcement",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub data: Option<serde_json::Value>,
    pub related_student_id: Option<Uuid>,
    pub related_user_id: Option<Uuid>,
    pub related_course_id: Option<Uuid>,
    pub related_request_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub unread: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AnnounceRequest {
    pub title: String,
    pub message: String,
    /// When absent, the announcement goes to every active user.
    pub recipient_ids: Option<Vec<Uuid>>,
}
