pub mod activity;
pub mod appointment;
pub mod auth;
pub mod collaboration;
pub mod course;
pub mod message;
pub mod note;
pub mod notification;
pub mod post;
pub mod progress_report;
pub mod student;
pub mod user;
