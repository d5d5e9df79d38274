use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Parent,
    Psychiatrist,
    Therapist,
    SchoolStaff,
    SpecialistEducator,
    MinistryStaff,
}

impl Role {
    /// Roles allowed to appear in the professionals directory.
    pub fn is_professional(&self) -> bool {
        matches!(
            self,
            Role::Psychiatrist | Role::Therapist | Role::SchoolStaff | Role::SpecialistEducator
        )
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Parent => "parent",
            Role::Psychiatrist => "psychiatrist",
            Role::Therapist => "therapist",
            Role::SchoolStaff => "school_staff",
            Role::SpecialistEducator => "specialist_educator",
            Role::MinistryStaff => "ministry_staff",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Role::Parent),
            "psychiatrist" => Ok(Role::Psychiatrist),
            "therapist" => Ok(Role::Therapist),
            "school_staff" => Ok(Role::SchoolStaff),
            "specialist_educator" => Ok(Role::SpecialistEducator),
            "ministry_staff" => Ok(Role::MinistryStaff),
            _ => Err(anyhow::anyhow!("Unknown role: {s}")),
        }
    }
}

/// DB row struct — role is stored as TEXT and parsed at the edges.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub specialization: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub specialization: Option<String>,
    pub is_admin: bool,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role.parse().unwrap_or(Role::Parent),
            specialization: u.specialization,
            is_admin: u.is_admin,
        }
    }
}

/// Directory entry for picking collaborators or message recipients.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProfessionalDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_wire_strings() {
        for s in [
            "parent",
            "psychiatrist",
            "therapist",
            "school_staff",
            "specialist_educator",
            "ministry_staff",
        ] {
            let role: Role = s.parse().unwrap();
            assert_eq!(role.to_string(), s);
        }
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn professional_roles_exclude_parent_and_ministry() {
        assert!(Role::Therapist.is_professional());
        assert!(Role::SpecialistEducator.is_professional());
        assert!(!Role::Parent.is_professional());
        assert!(!Role::MinistryStaff.is_professional());
    }
}
