use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use shared::{boleta::ListShapeError, BoletasFilters};
use std::time::Duration;
use tracing::debug;

/// The two lists mirrored by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoletaList {
    Facturadas,
    NoFacturadas,
}

impl BoletaList {
    pub fn path(&self) -> &'static str {
        match self {
            BoletaList::Facturadas => "api/boletas/facturadas",
            BoletaList::NoFacturadas => "api/boletas/no-facturadas",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session expired")]
    Unauthorized,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Shape(#[from] ListShapeError),
}

impl StoreError {
    /// Plain-language message for the snapshot.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Unauthorized => "Tu sesión expiró. Inicia sesión nuevamente.".to_string(),
            StoreError::Http { status, message } => {
                format!("El servidor respondió con error {}: {}", status, message)
            }
            StoreError::Network(_) => "No se pudo conectar con el servidor.".to_string(),
            StoreError::Shape(_) => "El servidor devolvió una respuesta inesperada.".to_string(),
        }
    }
}

#[async_trait]
pub trait BoletasApi: Send + Sync {
    /// Raw list payload: a bare array or an `{items: [...]}` wrapper.
    async fn fetch_list(
        &self,
        list: BoletaList,
        token: &str,
        filters: &BoletasFilters,
        limit: usize,
    ) -> Result<Value, StoreError>;
}

/// Fetches through the front proxy routes.
#[derive(Debug, Clone)]
pub struct HttpBoletasApi {
    client: Client,
    base_url: String,
}

impl HttpBoletasApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: shared::utils::normalize_base(&base_url.into()),
        }
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl BoletasApi for HttpBoletasApi {
    async fn fetch_list(
        &self,
        list: BoletaList,
        token: &str,
        filters: &BoletasFilters,
        limit: usize,
    ) -> Result<Value, StoreError> {
        let url = shared::utils::join_url(&self.base_url, list.path());
        let mut query = vec![("limit", limit.to_string())];
        query.extend(filters.to_query_pairs());

        debug!("📥 GET {} {:?}", url, query);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthorized);
        }
        if !status.is_success() {
            return Err(StoreError::Http {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|_| StoreError::Http {
            status: status.as_u16(),
            message: "response is not JSON".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(error_message(r#"{"detail":"invalid cuit"}"#), "invalid cuit");
        assert_eq!(error_message(r#"{"message":"boom"}"#), "boom");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
