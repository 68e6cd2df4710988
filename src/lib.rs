use axum::{extract::DefaultBodyLimit, Router};
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub mod api;
pub mod middleware;
pub mod monitoring;
pub mod observability;
pub mod state;
pub mod store;
pub mod upstream;

use api::create_api_router;
use monitoring::monitoring_router;
use observability::metrics_middleware;
use state::AppState;

use axum::middleware as axum_middleware;

/// Slack on top of the forwarder's worst case so exhaustion is reported by
/// the forwarder and not cut short by the inbound timeout.
const FORWARD_MARGIN: Duration = Duration::from_secs(5);

/// Configured inbound timeout, raised to outlast a full candidate walk.
pub fn inbound_timeout(app_state: &AppState) -> Duration {
    let configured = Duration::from_secs(app_state.config.app.request_timeout_seconds);
    configured.max(app_state.forwarder.worst_case_duration() + FORWARD_MARGIN)
}

pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    let body_limit = (app_state.config.app.max_request_size_mb as usize) * 1024 * 1024;
    let request_timeout = inbound_timeout(&app_state);

    Router::new()
        // Endpoints de monitoreo (sin autenticación) - incluye /metrics de Prometheus
        .merge(monitoring_router())
        // Rutas proxy hacia el backend
        .merge(create_api_router())
        .with_state(app_state)
        // Un request que ya pasó por este proxy no se reenvía
        .layer(axum_middleware::from_fn(middleware::reject_proxy_loops))
        .layer(axum_middleware::from_fn(metrics_middleware))
        .layer(DefaultBodyLimit::max(body_limit)) // certificados
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
