use shared::Config;
use std::time::Instant;

use crate::upstream::Forwarder;

/// Estado compartido de la aplicación.
/// Configuración leída al arrancar y el forwarder hacia el backend.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub forwarder: Forwarder,
    pub started_at: Instant,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let forwarder = Forwarder::new(&config.backend)?;

        tracing::info!(
            "🔗 Backend candidates: {}",
            forwarder.candidates().urls().join(" → ")
        );

        Ok(AppState {
            config,
            forwarder,
            started_at: Instant::now(),
        })
    }
}
