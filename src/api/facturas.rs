//! Issued invoices: PDF and ticket downloads, credit-note voiding.

use axum::{
    extract::{Path, State},
    http::Method,
};
use bytes::Bytes;
use shared::Result;
use std::sync::Arc;
use tracing::info;

use super::common::{json_body, segment, InboundContext};
use crate::{state::AppState, upstream::UpstreamResponse};

pub async fn download_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    let id = segment(&id)?;
    state
        .forwarder
        .forward(
            ctx.request(Method::GET, format!("facturas/{}/pdf", id))
                .download(format!("factura-{}.pdf", id)),
        )
        .await
}

pub async fn download_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    let id = segment(&id)?;
    state
        .forwarder
        .forward(
            ctx.request(Method::GET, format!("facturas/{}/ticket", id))
                .download(format!("ticket-{}.pdf", id)),
        )
        .await
}

/// Voids an invoice by issuing a credit note. The optional body carries
/// the reason (`motivo`).
pub async fn anular(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
    body: Bytes,
) -> Result<UpstreamResponse> {
    let body = json_body(&body)?;
    let id = segment(&id)?;
    info!("🧾 Credit note requested for factura {}", id);
    state
        .forwarder
        .forward(ctx.request(Method::POST, format!("facturas/{}/nota-credito", id)).body(body))
        .await
}
