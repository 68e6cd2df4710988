//! Company administration and tax-authority certificate management.

use axum::{
    extract::{Path, State},
    http::Method,
};
use bytes::Bytes;
use shared::Result;
use std::sync::Arc;

use super::common::{json_body, required_json_body, segment, InboundContext};
use crate::{state::AppState, upstream::UpstreamResponse};

pub async fn list_empresas(
    State(state): State<Arc<AppState>>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    state.forwarder.forward(ctx.request(Method::GET, "empresas")).await
}

pub async fn create_empresa(
    State(state): State<Arc<AppState>>,
    ctx: InboundContext,
    body: Bytes,
) -> Result<UpstreamResponse> {
    let body = required_json_body(&body)?;
    state
        .forwarder
        .forward(ctx.request(Method::POST, "empresas").body(body))
        .await
}

pub async fn get_empresa(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    let resource = format!("empresas/{}", segment(&id)?);
    state.forwarder.forward(ctx.request(Method::GET, resource)).await
}

pub async fn update_empresa(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
    body: Bytes,
) -> Result<UpstreamResponse> {
    let body = required_json_body(&body)?;
    let resource = format!("empresas/{}", segment(&id)?);
    state
        .forwarder
        .forward(ctx.request(Method::PUT, resource).body(body))
        .await
}

pub async fn delete_empresa(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    let resource = format!("empresas/{}", segment(&id)?);
    state.forwarder.forward(ctx.request(Method::DELETE, resource)).await
}

// Certificado digital

pub async fn get_certificado(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    let resource = format!("empresas/{}/certificado", segment(&id)?);
    state.forwarder.forward(ctx.request(Method::GET, resource)).await
}

/// The certificate file (multipart or raw .pfx) is relayed byte for byte
/// with its original content type.
pub async fn upload_certificado(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
    body: Bytes,
) -> Result<UpstreamResponse> {
    let body = if ctx
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("application/json"))
    {
        json_body(&body)?
    } else {
        ctx.raw_body(body)
    };
    let resource = format!("empresas/{}/certificado", segment(&id)?);
    state
        .forwarder
        .forward(ctx.request(Method::POST, resource).body(body))
        .await
}

pub async fn delete_certificado(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    let resource = format!("empresas/{}/certificado", segment(&id)?);
    state.forwarder.forward(ctx.request(Method::DELETE, resource)).await
}

pub async fn download_certificado(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    let id = segment(&id)?;
    let resource = format!("empresas/{}/certificado/archivo", id);
    state
        .forwarder
        .forward(
            ctx.request(Method::GET, resource)
                .download(format!("certificado-{}.pfx", id)),
        )
        .await
}
