pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod validation;

pub use app::{build_app, AppCapabilities, AppOptions, AppState};
