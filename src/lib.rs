pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod graphql;
pub mod models;
pub mod providers;
pub mod repositories;
pub mod services;
pub mod state;

pub use errors::{AppError, AppResult};
pub use state::AppState;
