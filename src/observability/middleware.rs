// ============================================================================
// MIDDLEWARE PARA MÉTRICAS AUTOMÁTICAS
// ============================================================================

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::record_http_request;

/// Registra método, ruta normalizada, status y duración de cada request
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let normalized_path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    record_http_request(
        &method,
        &normalized_path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}

/// Agrupa rutas con ids dinámicos bajo `:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            let is_uuid = seg.len() == 36 && seg.chars().filter(|c| *c == '-').count() == 4;
            if is_uuid || (!seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit())) {
                ":id"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::normalize_path;

    #[test]
    fn test_normalize_path_groups_ids() {
        assert_eq!(normalize_path("/api/facturas/1234/pdf"), "/api/facturas/:id/pdf");
        assert_eq!(
            normalize_path("/api/empresas/6f1c2f4e-8a1b-4c4f-9d2e-0a9b8c7d6e5f"),
            "/api/empresas/:id"
        );
        assert_eq!(normalize_path("/api/boletas/no-facturadas"), "/api/boletas/no-facturadas");
    }
}
