//! Mantiene el store de boletas vivo contra el proxy y registra cada cambio.
//!
//! FRONT_URL     base del servidor proxy (por defecto http://127.0.0.1:3000)
//! SESSION_FILE  JSON con `token` y `user` (por defecto .ima_session.json)

use facturacion_ima_web::store::{
    BoletasStore, FileSessionStorage, HttpBoletasApi, StoreEvent,
};
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let front_url = std::env::var("FRONT_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let session_file = std::env::var("SESSION_FILE").unwrap_or_else(|_| ".ima_session.json".to_string());

    let api = HttpBoletasApi::new(&front_url, Duration::from_secs(30))
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
    let store = BoletasStore::new(Arc::new(api), Arc::new(FileSessionStorage::new(&session_file)));

    let mut snapshots = store.subscribe();
    let mut events = store.events();

    info!("📡 Watching boletas through {}", front_url);
    let poller = store.start().await;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(error) = &snapshot.error {
                    warn!("⚠️ {}", error);
                }
                info!(
                    "📋 facturadas={} no_facturadas={} loading={} actualizado={:?}",
                    snapshot.facturadas.len(),
                    snapshot.no_facturadas.len(),
                    snapshot.loading,
                    snapshot.last_updated
                );
            }
            event = events.recv() => {
                if let Ok(StoreEvent::SessionExpired) = event {
                    warn!("🔒 Sesión expirada; inicia sesión y vuelve a ejecutar");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("signal received, stopping");
                break;
            }
        }
    }

    poller.abort();
    Ok(())
}
