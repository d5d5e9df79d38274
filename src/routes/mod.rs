pub mod activities;
pub mod appointments;
pub mod auth;
pub mod collaboration_requests;
pub mod courses;
pub mod health;
pub mod messages;
pub mod notes;
pub mod notifications;
pub mod posts;
pub mod progress_reports;
pub mod students;
pub mod users;

use crate::{
    error::AppError,
    models::{auth::AuthenticatedUser, user::Role},
};

/// Coarse role checks shared by the handlers. Fine-grained, per-student
/// access goes through `services::access` instead.
pub fn require_admin(user: &AuthenticatedUser) -> Result<(), AppError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(AppError::Authorization("Admin access required".into()))
    }
}

pub fn require_role(user: &AuthenticatedUser, role: Role) -> Result<(), AppError> {
    if user.role == role || user.is_admin {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "Requires the {role} role"
        )))
    }
}
