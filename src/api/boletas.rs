//! Boletas listings and batch invoicing.

use axum::{extract::State, http::Method};
use bytes::Bytes;
use shared::Result;
use std::sync::Arc;
use tracing::info;

use super::common::{required_json_body, InboundContext};
use crate::{state::AppState, upstream::UpstreamResponse};

/// Query string (`limit`, `fecha_desde`, `fecha_hasta`, ...) passes through.
pub async fn list_facturadas(
    State(state): State<Arc<AppState>>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    state
        .forwarder
        .forward(ctx.request(Method::GET, "boletas/facturadas"))
        .await
}

pub async fn list_no_facturadas(
    State(state): State<Arc<AppState>>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    state
        .forwarder
        .forward(ctx.request(Method::GET, "boletas/no-facturadas"))
        .await
}

/// Emits invoices for a batch of pending boletas. Reaches at most one
/// backend: the forwarder stops at the first authoritative answer.
pub async fn facturar(
    State(state): State<Arc<AppState>>,
    ctx: InboundContext,
    body: Bytes,
) -> Result<UpstreamResponse> {
    let body = required_json_body(&body)?;
    info!("🧾 Batch invoicing requested");
    state
        .forwarder
        .forward(ctx.request(Method::POST, "boletas/facturar").body(body))
        .await
}
