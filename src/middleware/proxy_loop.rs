use axum::{extract::Request, middleware::Next, response::Response};
use shared::AppError;
use tracing::error;

use crate::observability::record_loop_rejection;
use crate::upstream::PROXY_HOP_HEADER;

/// A request carrying the hop marker was sent by this proxy itself, so a
/// backend base resolves back to us. Forwarding it again would recurse.
pub async fn reject_proxy_loops(request: Request, next: Next) -> Result<Response, AppError> {
    if request.headers().contains_key(PROXY_HOP_HEADER) {
        error!(
            "🔁 Proxy loop: {} {} arrived with {}",
            request.method(),
            request.uri().path(),
            PROXY_HOP_HEADER
        );
        record_loop_rejection("hop_marker");
        return Err(AppError::recursion(
            "request was already forwarded by this proxy; a backend base points back at the front server",
        ));
    }

    Ok(next.run(request).await)
}
