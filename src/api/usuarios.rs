//! User administration.

use axum::{
    extract::{Path, State},
    http::Method,
};
use bytes::Bytes;
use shared::Result;
use std::sync::Arc;

use super::common::{required_json_body, segment, InboundContext};
use crate::{state::AppState, upstream::UpstreamResponse};

pub async fn list_usuarios(
    State(state): State<Arc<AppState>>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    state.forwarder.forward(ctx.request(Method::GET, "usuarios")).await
}

pub async fn create_usuario(
    State(state): State<Arc<AppState>>,
    ctx: InboundContext,
    body: Bytes,
) -> Result<UpstreamResponse> {
    let body = required_json_body(&body)?;
    state
        .forwarder
        .forward(ctx.request(Method::POST, "usuarios").body(body))
        .await
}

pub async fn get_usuario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    let resource = format!("usuarios/{}", segment(&id)?);
    state.forwarder.forward(ctx.request(Method::GET, resource)).await
}

pub async fn update_usuario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
    body: Bytes,
) -> Result<UpstreamResponse> {
    let body = required_json_body(&body)?;
    let resource = format!("usuarios/{}", segment(&id)?);
    state
        .forwarder
        .forward(ctx.request(Method::PUT, resource).body(body))
        .await
}

pub async fn delete_usuario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ctx: InboundContext,
) -> Result<UpstreamResponse> {
    let resource = format!("usuarios/{}", segment(&id)?);
    state.forwarder.forward(ctx.request(Method::DELETE, resource)).await
}
