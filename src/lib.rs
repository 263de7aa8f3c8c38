pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod features;
pub mod validation;

pub use api::{build_app, AppState};
pub use config::AppConfig;
pub use database::Database;
pub use error::AppError;
