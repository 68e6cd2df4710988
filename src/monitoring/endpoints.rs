use axum::{extract::State, response::Json};
use shared::{HealthStatus, ServiceStatus};
use std::sync::Arc;

use crate::state::AppState;

/// Liveness plus the backend candidates this process will try.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let backend_candidates = state.forwarder.candidates().urls();
    let status = if backend_candidates.is_empty() {
        ServiceStatus::Unhealthy
    } else {
        ServiceStatus::Healthy
    };

    Json(HealthStatus {
        service: "facturacion-ima-web".to_string(),
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        backend_candidates,
    })
}
