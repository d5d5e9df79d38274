use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth::AuthenticatedUser,
        collaboration::{
            CollaborationRequest, CollaborationRequestDetail, CreateCollaborationRequest,
            RequestStatus,
        },
        user::Role,
    },
    services::notifications::{self, NotificationService},
};

/// Ministry staff may never request collaboration, regardless of student.
pub fn ensure_may_request(role: Role) -> Result<(), AppError> {
    if role == Role::MinistryStaff {
        return Err(AppError::Validation(
            "Ministry staff may not request collaboration access".into(),
        ));
    }
    Ok(())
}

/// Approved and rejected are terminal; only pending requests can move.
pub fn ensure_pending(status: RequestStatus) -> Result<(), AppError> {
    if status != RequestStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Request has already been {status}"
        )));
    }
    Ok(())
}

/// Resolve the admin response for a decision. A rejection must carry an
/// explanation; an approval falls back to a default message.
pub fn resolve_admin_response(
    decision: RequestStatus,
    admin_response: Option<String>,
) -> Result<String, AppError> {
    let trimmed = admin_response
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    match decision {
        RequestStatus::Approved => Ok(trimmed.unwrap_or_else(|| "Request approved".to_string())),
        RequestStatus::Rejected => trimmed.ok_or_else(|| {
            AppError::Validation("A rejection must include an admin response".into())
        }),
        RequestStatus::Pending => Err(AppError::Validation(
            "Status must be approved or rejected".into(),
        )),
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

pub struct CollaborationService;

impl CollaborationService {
    /// Create a pending request and notify every admin.
    pub async fn create(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        req: &CreateCollaborationRequest,
    ) -> Result<CollaborationRequest, AppError> {
        ensure_may_request(actor.role)?;

        if req.reason.trim().is_empty() {
            return Err(AppError::Validation("A reason is required".into()));
        }

        let student_name: Option<(String, String)> =
            sqlx::query_as("SELECT first_name, last_name FROM students WHERE id = $1")
                .bind(req.student_id)
                .fetch_optional(pool)
                .await?;
        let student_name = student_name
            .map(|(first, last)| format!("{first} {last}"))
            .ok_or_else(|| AppError::NotFound("Student not found".into()))?;

        let already_active: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM collaboration_requests
             WHERE requester_id = $1 AND student_id = $2 AND status <> 'rejected')",
        )
        .bind(actor.user_id)
        .bind(req.student_id)
        .fetch_one(pool)
        .await?;
        if already_active {
            return Err(AppError::Conflict(
                "An active request for this student already exists".into(),
            ));
        }

        // The partial unique index still backs the pre-check against races.
        let request = sqlx::query_as::<_, CollaborationRequest>(
            "INSERT INTO collaboration_requests (requester_id, student_id, request_type, reason)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(actor.user_id)
        .bind(req.student_id)
        .bind(req.request_type.to_string())
        .bind(req.reason.trim())
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("An active request for this student already exists".into())
            } else {
                AppError::Database(e)
            }
        })?;

        let requester_name = NotificationService::user_name(pool, actor.user_id).await;
        let admins = NotificationService::admin_recipients(pool).await?;
        let payload = notifications::request_created(&requester_name, &student_name)
            .student(req.student_id)
            .user(actor.user_id)
            .request(request.id);
        NotificationService::fan_out(pool, &admins, &payload).await;

        Ok(request)
    }

    /// Approve or reject a pending request. Approval folds the requester
    /// into the student's assignment list inside the same transaction as
    /// the status flip, so a crash cannot leave an approved request without
    /// its membership.
    pub async fn update_status(
        pool: &PgPool,
        actor: &AuthenticatedUser,
        request_id: Uuid,
        decision: RequestStatus,
        admin_response: Option<String>,
    ) -> Result<CollaborationRequest, AppError> {
        let response = resolve_admin_response(decision, admin_response)?;

        let request = sqlx::query_as::<_, CollaborationRequest>(
            "SELECT * FROM collaboration_requests WHERE id = $1",
        )
        .bind(request_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Collaboration request not found".into()))?;

        let current: RequestStatus = request
            .status
            .parse()
            .map_err(|_| AppError::Internal(format!("Corrupt request status: {}", request.status)))?;
        ensure_pending(current)?;

        let updated = match decision {
            RequestStatus::Approved => {
                let mut tx = pool.begin().await?;
                let updated = sqlx::query_as::<_, CollaborationRequest>(
                    "UPDATE collaboration_requests
                     SET status = 'approved', admin_response = $1,
                         approved_by = $2, approved_at = $3, updated_at = NOW()
                     WHERE id = $4
                     RETURNING *",
                )
                .bind(&response)
                .bind(actor.user_id)
                .bind(Utc::now())
                .bind(request_id)
                .fetch_one(&mut *tx)
                .await?;

                // Idempotent: approving twice never duplicates membership.
                sqlx::query(
                    "INSERT INTO student_assignments (student_id, user_id, assigned_by)
                     VALUES ($1, $2, $3)
                     ON CONFLICT (student_id, user_id) DO NOTHING",
                )
                .bind(request.student_id)
                .bind(request.requester_id)
                .bind(actor.user_id)
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;
                updated
            }
            RequestStatus::Rejected => {
                sqlx::query_as::<_, CollaborationRequest>(
                    "UPDATE collaboration_requests
                     SET status = 'rejected', admin_response = $1, updated_at = NOW()
                     WHERE id = $2
                     RETURNING *",
                )
                .bind(&response)
                .bind(request_id)
                .fetch_one(pool)
                .await?
            }
            RequestStatus::Pending => unreachable!("rejected by resolve_admin_response"),
        };

        let student_name = sqlx::query_as::<_, (String, String)>(
            "SELECT first_name, last_name FROM students WHERE id = $1",
        )
        .bind(request.student_id)
        .fetch_optional(pool)
        .await?
        .map(|(first, last)| format!("{first} {last}"))
        .unwrap_or_else(|| "Unknown".to_string());

        let payload = match decision {
            RequestStatus::Approved => {
                let approver_name = NotificationService::user_name(pool, actor.user_id).await;
                notifications::request_approved(&approver_name, &student_name)
            }
            _ => notifications::request_rejected(&student_name, Some(&response)),
        }
        .student(request.student_id)
        .user(actor.user_id)
        .request(request.id);
        NotificationService::fan_out(pool, &[request.requester_id], &payload).await;

        Ok(updated)
    }

    /// Admin view: all requests, newest first, names joined in.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<CollaborationRequestDetail>, AppError> {
        let rows = sqlx::query_as::<_, CollaborationRequestDetail>(
            "SELECT r.id, r.requester_id,
                    CONCAT(u.first_name, ' ', u.last_name) AS requester_name,
                    u.role AS requester_role,
                    r.student_id,
                    CONCAT(s.first_name, ' ', s.last_name) AS student_name,
                    r.request_type, r.reason, r.status, r.admin_response, r.created_at
             FROM collaboration_requests r
             JOIN users u ON u.id = r.requester_id
             JOIN students s ON s.id = r.student_id
             ORDER BY r.created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_mine(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<CollaborationRequest>, AppError> {
        let rows = sqlx::query_as::<_, CollaborationRequest>(
            "SELECT * FROM collaboration_requests
             WHERE requester_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ministry_staff_may_never_request() {
        assert!(matches!(
            ensure_may_request(Role::MinistryStaff),
            Err(AppError::Validation(_))
        ));
        for role in [
            Role::Parent,
            Role::Psychiatrist,
            Role::Therapist,
            Role::SchoolStaff,
            Role::SpecialistEducator,
        ] {
            assert!(ensure_may_request(role).is_ok());
        }
    }

    #[test]
    fn terminal_states_cannot_transition() {
        assert!(ensure_pending(RequestStatus::Pending).is_ok());
        assert!(matches!(
            ensure_pending(RequestStatus::Approved),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            ensure_pending(RequestStatus::Rejected),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn approval_defaults_the_admin_response() {
        let response = resolve_admin_response(RequestStatus::Approved, None).unwrap();
        assert_eq!(response, "Request approved");
        let custom =
            resolve_admin_response(RequestStatus::Approved, Some("welcome aboard".into())).unwrap();
        assert_eq!(custom, "welcome aboard");
    }

    #[test]
    fn rejection_requires_an_explanation() {
        assert!(matches!(
            resolve_admin_response(RequestStatus::Rejected, None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            resolve_admin_response(RequestStatus::Rejected, Some("   ".into())),
            Err(AppError::Validation(_))
        ));
        let response = resolve_admin_response(
            RequestStatus::Rejected,
            Some("insufficient justification".into()),
        )
        .unwrap();
        assert_eq!(response, "insufficient justification");
    }

    #[test]
    fn pending_is_not_a_decision() {
        assert!(matches!(
            resolve_admin_response(RequestStatus::Pending, None),
            Err(AppError::Validation(_))
        ));
    }
}
