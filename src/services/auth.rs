use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    middleware::auth::issue_access_token,
    models::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        user::{Role, User},
    },
};

pub struct AuthService;

impl AuthService {
    /// Register a new account. `is_admin` is honored only for the
    /// specialist_educator role and only while no admin exists — the first
    /// claim wins, backed by the partial unique index against races.
    pub async fn register(
        pool: &PgPool,
        config: &Config,
        req: &RegisterRequest,
    ) -> Result<AuthResponse, AppError> {
        if !req.email.contains('@') {
            return Err(AppError::Validation("A valid email is required".into()));
        }
        if req.password.len() < 8 {
            return Err(AppError::Validation(
                "Password must be at least 8 characters".into(),
            ));
        }
        if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
            return Err(AppError::Validation("First and last name are required".into()));
        }

        let wants_admin = req.is_admin.unwrap_or(false);
        if wants_admin {
            if req.role != Role::SpecialistEducator {
                return Err(AppError::Validation(
                    "Only a specialist educator can hold the admin account".into(),
                ));
            }
            let admin_exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE is_admin = TRUE)")
                    .fetch_one(pool)
                    .await?;
            if admin_exists {
                return Err(AppError::Conflict("An admin account already exists".into()));
            }
        }

        let password_hash = bcrypt::hash(&req.password, 12)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, first_name, last_name, role, specialization, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(req.email.trim().to_lowercase())
        .bind(&password_hash)
        .bind(req.first_name.trim())
        .bind(req.last_name.trim())
        .bind(req.role.to_string())
        .bind(&req.specialization)
        .bind(wants_admin)
        .fetch_one(pool)
        .await
        .map_err(|e| match e.as_database_error().and_then(|db| db.constraint()) {
            Some("users_email_key") => AppError::Conflict("Email already registered".into()),
            Some("users_single_admin") => {
                AppError::Conflict("An admin account already exists".into())
            }
            _ => AppError::Database(e),
        })?;

        Self::respond_with_token(user, config)
    }

    pub async fn login(
        pool: &PgPool,
        config: &Config,
        req: &LoginRequest,
    ) -> Result<AuthResponse, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 AND is_active = TRUE",
        )
        .bind(req.email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid email or password".into()))?;

        let ok = bcrypt::verify(&req.password, &user.password_hash)?;
        if !ok {
            return Err(AppError::Authentication("Invalid email or password".into()));
        }

        Self::respond_with_token(user, config)
    }

    pub async fn profile(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        Ok(user)
    }

    fn respond_with_token(user: User, config: &Config) -> Result<AuthResponse, AppError> {
        let role: Role = user
            .role
            .parse()
            .map_err(|_| AppError::Internal(format!("Corrupt role: {}", user.role)))?;
        let access_token =
            issue_access_token(&user, role, &config.jwt_secret, config.jwt_expiry_seconds)?;
        Ok(AuthResponse {
            access_token,
            user: user.into(),
        })
    }
}
