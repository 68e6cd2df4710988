pub mod endpoints;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::observability::metrics_handler;
use crate::state::AppState;

/// Endpoints de monitoreo, sin autenticación
pub fn monitoring_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(endpoints::health_check))
        .route("/metrics", get(metrics_handler))
}
