//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::elemental::ELEMENTAL_VERSION;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub elemental_version: String,
    pub uptime_seconds: u64,
}

/// GET /health - Liveness and build information
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        elemental_version: ELEMENTAL_VERSION.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
