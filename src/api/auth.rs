//! Session routes. Login is the only proxy route reachable without a token.

use axum::{extract::State, http::Method};
use bytes::Bytes;
use shared::Result;
use std::sync::Arc;

use super::common::{json_body, required_json_body, InboundContext};
use crate::{state::AppState, upstream::UpstreamResponse};

pub async fn login(
    State(state): State<Arc<AppState>>,
    ctx: InboundContext,
    body: Bytes,
) -> Result<UpstreamResponse> {
    let body = required_json_body(&body)?;
    state
        .forwarder
        .forward(ctx.request(Method::POST, "auth/login").body(body))
        .await
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    ctx: InboundContext,
    body: Bytes,
) -> Result<UpstreamResponse> {
    let body = json_body(&body)?;
    state
        .forwarder
        .forward(ctx.request(Method::POST, "auth/logout").body(body))
        .await
}

pub async fn me(State(state): State<Arc<AppState>>, ctx: InboundContext) -> Result<UpstreamResponse> {
    state.forwarder.forward(ctx.request(Method::GET, "auth/me")).await
}
