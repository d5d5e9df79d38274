pub mod access;
pub mod activities;
pub mod appointments;
pub mod auth;
pub mod collaboration;
pub mod courses;
pub mod messages;
pub mod notes;
pub mod notifications;
pub mod posts;
pub mod progress_reports;
pub mod students;
pub mod users;
