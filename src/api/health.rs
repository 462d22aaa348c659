use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

const MODULES: [&str; 3] = ["identity", "billing", "training-plan"];

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub modules: [&'static str; 3],
    /// How modules reach each other's public APIs in this process
    pub module_integration: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        modules: MODULES,
        module_integration: state.module_integration.as_str(),
        timestamp: Utc::now(),
    })
}
