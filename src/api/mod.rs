pub mod auth;
pub mod boletas;
pub mod common;
pub mod empresas;
pub mod facturas;
pub mod usuarios;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::middleware::require_authorization;
use crate::state::AppState;

pub fn create_api_router() -> Router<Arc<AppState>> {
    // Rutas públicas
    let public = Router::new().route("/api/auth/login", post(auth::login));

    // Rutas que requieren Authorization
    let protected = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Empresas
        .route(
            "/api/empresas",
            get(empresas::list_empresas).post(empresas::create_empresa),
        )
        .route(
            "/api/empresas/:id",
            get(empresas::get_empresa)
                .put(empresas::update_empresa)
                .delete(empresas::delete_empresa),
        )
        // Certificado digital
        .route(
            "/api/empresas/:id/certificado",
            get(empresas::get_certificado)
                .post(empresas::upload_certificado)
                .delete(empresas::delete_certificado),
        )
        .route(
            "/api/empresas/:id/certificado/descargar",
            get(empresas::download_certificado),
        )
        // Usuarios
        .route(
            "/api/usuarios",
            get(usuarios::list_usuarios).post(usuarios::create_usuario),
        )
        .route(
            "/api/usuarios/:id",
            get(usuarios::get_usuario)
                .put(usuarios::update_usuario)
                .delete(usuarios::delete_usuario),
        )
        // Boletas
        .route("/api/boletas/facturadas", get(boletas::list_facturadas))
        .route("/api/boletas/no-facturadas", get(boletas::list_no_facturadas))
        .route("/api/boletas/facturar", post(boletas::facturar))
        // Facturas
        .route("/api/facturas/:id/pdf", get(facturas::download_pdf))
        .route("/api/facturas/:id/ticket", get(facturas::download_ticket))
        .route("/api/facturas/:id/anular", post(facturas::anular))
        .route_layer(middleware::from_fn(require_authorization));

    public.merge(protected)
}
