//! Configuration management for the front proxy and its clients

use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_LOCAL_FALLBACK: &str = "http://127.0.0.1:8008";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub app: AppConfig,
}

/// Where the real backend may live. Read once at startup and passed
/// by reference into every forwarder call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Trusted same-host backend, tried first and exempt from self-call checks.
    pub internal_base: Option<String>,
    /// Externally advertised backend URL.
    pub public_base: Option<String>,
    pub local_fallback: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub log_level: String,
    pub port: u16,
    pub max_request_size_mb: u64,
    pub request_timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            internal_base: None,
            public_base: None,
            local_fallback: DEFAULT_LOCAL_FALLBACK.to_string(),
            timeout_seconds: 15,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            port: 3000,
            max_request_size_mb: 10,
            request_timeout_seconds: 60,
        }
    }
}

/// Empty or whitespace-only variables count as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            backend: BackendConfig {
                internal_base: non_empty_var("BACKEND_INTERNAL_URL"),
                public_base: non_empty_var("BACKEND_PUBLIC_URL")
                    .or_else(|| non_empty_var("NEXT_PUBLIC_API_URL")),
                local_fallback: non_empty_var("BACKEND_LOCAL_FALLBACK")
                    .unwrap_or_else(|| DEFAULT_LOCAL_FALLBACK.to_string()),
                timeout_seconds: env::var("BACKEND_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()?,
            },
            app: AppConfig {
                environment: env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "info".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                max_request_size_mb: env::var("MAX_REQUEST_SIZE_MB")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()?,
            },
        })
    }
}
