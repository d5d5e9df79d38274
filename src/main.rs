use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carelink_api::config::Config;
use carelink_api::middleware::auth::JwtSecret;
use carelink_api::{db, routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let config = Arc::new(config);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let state = AppState {
        db: pool,
        config: config.clone(),
    };

    // CORS: the configured frontend origin, plus localhost for development.
    let base_url = config.app_base_url.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base_url
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/me", get(routes::auth::me))
        // Users
        .route("/api/users", get(routes::users::list_users))
        .route("/api/users/professionals", get(routes::users::list_professionals))
        .route("/api/users/{id}", put(routes::users::update_user))
        // Students
        .route("/api/students", get(routes::students::list_students).post(routes::students::create_student))
        .route("/api/students/{id}", get(routes::students::get_student).put(routes::students::update_student))
        .route("/api/students/{id}/assign", post(routes::students::assign_users))
        .route("/api/students/{id}/assign-self", post(routes::students::assign_self))
        // Collaboration requests
        .route("/api/collaboration-requests", post(routes::collaboration_requests::create_request))
        .route("/api/collaboration-requests/all", get(routes::collaboration_requests::list_all))
        .route("/api/collaboration-requests/my", get(routes::collaboration_requests::list_mine))
        .route("/api/collaboration-requests/{id}/status", put(routes::collaboration_requests::update_status))
        .route("/api/collaboration-requests/access/{student_id}", get(routes::collaboration_requests::access_status))
        // Notes
        .route("/api/students/{id}/notes", get(routes::notes::list_notes).post(routes::notes::create_note))
        .route("/api/notes/{id}", put(routes::notes::update_note).delete(routes::notes::delete_note))
        // Appointments
        .route("/api/students/{id}/appointments", get(routes::appointments::list_appointments).post(routes::appointments::create_appointment))
        .route("/api/appointments/{id}", put(routes::appointments::update_appointment).delete(routes::appointments::delete_appointment))
        // Progress reports
        .route("/api/students/{id}/progress-reports", get(routes::progress_reports::list_reports).post(routes::progress_reports::create_report))
        .route("/api/progress-reports/{id}", put(routes::progress_reports::update_report).delete(routes::progress_reports::delete_report))
        // Notifications
        .route("/api/notifications/my", get(routes::notifications::list_my))
        .route("/api/notifications/unread-count", get(routes::notifications::unread_count))
        .route("/api/notifications/mark-all-read", put(routes::notifications::mark_all_read))
        .route("/api/notifications/announce", post(routes::notifications::announce))
        .route("/api/notifications/{id}/read", put(routes::notifications::mark_read))
        .route("/api/notifications/{id}", delete(routes::notifications::delete_notification))
        // Courses
        .route("/api/courses", get(routes::courses::list_courses).post(routes::courses::create_course))
        .route("/api/courses/{id}", get(routes::courses::get_course).put(routes::courses::update_course).delete(routes::courses::delete_course))
        .route("/api/courses/{id}/publish", post(routes::courses::publish_course))
        .route("/api/courses/{id}/sections", post(routes::courses::add_section))
        .route("/api/sections/{id}/lessons", post(routes::courses::add_lesson))
        .route("/api/lessons/{id}/complete", post(routes::courses::complete_lesson))
        .route("/api/courses/{id}/access-requests", post(routes::courses::request_access))
        .route("/api/course-access-requests/all", get(routes::courses::list_access_all))
        .route("/api/course-access-requests/my", get(routes::courses::list_access_mine))
        .route("/api/course-access-requests/{id}/status", put(routes::courses::respond_access))
        // Activities
        .route("/api/activities", get(routes::activities::list_activities).post(routes::activities::create_activity))
        .route("/api/activities/{id}", put(routes::activities::update_activity).delete(routes::activities::delete_activity))
        // Messages
        .route("/api/messages", post(routes::messages::send_message))
        .route("/api/messages/conversations", get(routes::messages::get_conversations))
        .route("/api/messages/conversation/{user_id}", get(routes::messages::get_conversation))
        .route("/api/messages/{id}/read", put(routes::messages::mark_read))
        // Posts
        .route("/api/posts", get(routes::posts::list_posts).post(routes::posts::create_post))
        .route("/api/posts/{id}", put(routes::posts::update_post).delete(routes::posts::delete_post))
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("carelink API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
