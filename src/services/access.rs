use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{auth::AuthenticatedUser, collaboration::RequestStatus, user::Role},
};

/// Why access to a student's collaboration data was granted or denied.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    Admin,
    Assigned,
    Creator,
    ApprovedRequest,
    PendingRequest,
    MinistryStaffNoAccess,
    NoRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessStatus {
    pub has_access: bool,
    pub reason: AccessReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
}

/// Everything the access decision needs, gathered up front so the decision
/// itself stays a pure function.
#[derive(Debug, Clone)]
pub struct AccessSnapshot {
    pub student_created_by: Uuid,
    pub is_assigned: bool,
    pub active_request: Option<(Uuid, RequestStatus)>,
}

/// The collaboration-access rule. First match wins; the ordering of the
/// checks is part of the contract (admin > assigned > creator > request).
/// No side effects — safe to call both to gate writes and to render UI state.
pub fn decide(actor: &AuthenticatedUser, snapshot: &AccessSnapshot) -> AccessStatus {
    if actor.is_admin {
        return granted(AccessReason::Admin);
    }
    if snapshot.is_assigned {
        return granted(AccessReason::Assigned);
    }
    if actor.user_id == snapshot.student_created_by {
        return granted(AccessReason::Creator);
    }
    match snapshot.active_request {
        Some((_, RequestStatus::Approved)) => granted(AccessReason::ApprovedRequest),
        Some((id, RequestStatus::Pending)) => AccessStatus {
            has_access: false,
            reason: AccessReason::PendingRequest,
            request_id: Some(id),
        },
        _ if actor.role == Role::MinistryStaff => denied(AccessReason::MinistryStaffNoAccess),
        _ => denied(AccessReason::NoRequest),
    }
}

fn granted(reason: AccessReason) -> AccessStatus {
    AccessStatus {
        has_access: true,
        reason,
        request_id: None,
    }
}

fn denied(reason: AccessReason) -> AccessStatus {
    AccessStatus {
        has_access: false,
        reason,
        request_id: None,
    }
}

pub struct AccessService;

impl AccessService {
    /// Full access status for (actor, student) — NotFound if the student
    /// does not exist.
    pub async fn access_status(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        student_id: Uuid,
    ) -> Result<AccessStatus, AppError> {
        let snapshot = Self::snapshot(pool, actor, student_id).await?;
        Ok(decide(actor, &snapshot))
    }

    /// Boolean form used to gate student-scoped writes.
    pub async fn can_collaborate(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        student_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(Self::access_status(pool, actor, student_id).await?.has_access)
    }

    /// Like `can_collaborate`, but turns a denial into an Authorization error.
    pub async fn require_access(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        student_id: Uuid,
    ) -> Result<(), AppError> {
        if Self::can_collaborate(pool, actor, student_id).await? {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "No access to this student's records".into(),
            ))
        }
    }

    async fn snapshot(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        student_id: Uuid,
    ) -> Result<AccessSnapshot, AppError> {
        let created_by: Option<Uuid> =
            sqlx::query_scalar("SELECT created_by FROM students WHERE id = $1")
                .bind(student_id)
                .fetch_optional(pool)
                .await?;
        let student_created_by =
            created_by.ok_or_else(|| AppError::NotFound("Student not found".into()))?;

        let is_assigned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM student_assignments WHERE student_id = $1 AND user_id = $2)",
        )
        .bind(student_id)
        .bind(actor.user_id)
        .fetch_one(pool)
        .await?;

        let active: Option<(Uuid, String)> = sqlx::query_as(
            "SELECT id, status FROM collaboration_requests
             WHERE requester_id = $1 AND student_id = $2 AND status <> 'rejected'
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(actor.user_id)
        .bind(student_id)
        .fetch_optional(pool)
        .await?;

        let active_request = active.and_then(|(id, status)| {
            status.parse::<RequestStatus>().ok().map(|s| (id, s))
        });

        Ok(AccessSnapshot {
            student_created_by,
            is_assigned,
            active_request,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, is_admin: bool) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role,
            is_admin,
        }
    }

    // Unrelated creator, not assigned, no request.
    fn base_snapshot() -> AccessSnapshot {
        AccessSnapshot {
            student_created_by: Uuid::new_v4(),
            is_assigned: false,
            active_request: None,
        }
    }

    #[test]
    fn admin_wins_over_everything() {
        let admin = actor(Role::SpecialistEducator, true);
        let mut snap = base_snapshot();
        snap.is_assigned = true;
        snap.student_created_by = admin.user_id;
        let status = decide(&admin, &snap);
        assert!(status.has_access);
        assert_eq!(status.reason, AccessReason::Admin);
    }

    #[test]
    fn assigned_member_granted_before_creator() {
        let therapist = actor(Role::Therapist, false);
        let mut snap = base_snapshot();
        snap.is_assigned = true;
        snap.student_created_by = therapist.user_id;
        let status = decide(&therapist, &snap);
        assert!(status.has_access);
        assert_eq!(status.reason, AccessReason::Assigned);
    }

    #[test]
    fn creator_granted_without_assignment() {
        let parent = actor(Role::Parent, false);
        let mut snap = base_snapshot();
        snap.student_created_by = parent.user_id;
        let status = decide(&parent, &snap);
        assert!(status.has_access);
        assert_eq!(status.reason, AccessReason::Creator);
    }

    #[test]
    fn approved_request_grants_access() {
        let psychiatrist = actor(Role::Psychiatrist, false);
        let mut snap = base_snapshot();
        snap.active_request = Some((Uuid::new_v4(), RequestStatus::Approved));
        let status = decide(&psychiatrist, &snap);
        assert!(status.has_access);
        assert_eq!(status.reason, AccessReason::ApprovedRequest);
    }

    #[test]
    fn pending_request_denied_and_surfaces_id() {
        let psychiatrist = actor(Role::Psychiatrist, false);
        let request_id = Uuid::new_v4();
        let mut snap = base_snapshot();
        snap.active_request = Some((request_id, RequestStatus::Pending));
        let status = decide(&psychiatrist, &snap);
        assert!(!status.has_access);
        assert_eq!(status.reason, AccessReason::PendingRequest);
        assert_eq!(status.request_id, Some(request_id));
    }

    #[test]
    fn ministry_staff_denied_with_dedicated_reason() {
        let ministry = actor(Role::MinistryStaff, false);
        let snap = base_snapshot();
        let status = decide(&ministry, &snap);
        assert!(!status.has_access);
        assert_eq!(status.reason, AccessReason::MinistryStaffNoAccess);
    }

    #[test]
    fn stranger_denied_with_no_request() {
        let school = actor(Role::SchoolStaff, false);
        let snap = base_snapshot();
        let status = decide(&school, &snap);
        assert!(!status.has_access);
        assert_eq!(status.reason, AccessReason::NoRequest);
        assert_eq!(status.request_id, None);
    }

    #[test]
    fn decision_is_repeatable() {
        let therapist = actor(Role::Therapist, false);
        let mut snap = base_snapshot();
        snap.is_assigned = true;
        let first = decide(&therapist, &snap);
        let second = decide(&therapist, &snap);
        assert_eq!(first.has_access, second.has_access);
        assert_eq!(first.reason, second.reason);
    }
}
