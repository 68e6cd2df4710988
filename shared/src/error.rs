//! Error handling for the front proxy

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::types::ForwardAttempt;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Every candidate target tried, only present when all of them failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<Vec<ForwardAttempt>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Proxy loop detected: {message}")]
    RecursionDetected { message: String },

    #[error("No backend candidate answered {operation}")]
    UpstreamExhausted {
        operation: String,
        attempts: Vec<ForwardAttempt>,
        hint: String,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppError {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn recursion(message: impl Into<String>) -> Self {
        Self::RecursionDetected {
            message: message.into(),
        }
    }

    pub fn upstream_exhausted(
        operation: impl Into<String>,
        attempts: Vec<ForwardAttempt>,
        hint: impl Into<String>,
    ) -> Self {
        Self::UpstreamExhausted {
            operation: operation.into(),
            attempts,
            hint: hint.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::RecursionDetected { .. } => StatusCode::LOOP_DETECTED,
            AppError::UpstreamExhausted { .. } => StatusCode::BAD_GATEWAY,
            AppError::HttpClient(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Authentication { .. } => "AUTH_ERROR",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::BadRequest { .. } => "BAD_REQUEST",
            AppError::RecursionDetected { .. } => "PROXY_LOOP",
            AppError::UpstreamExhausted { .. } => "BACKEND_UNREACHABLE",
            AppError::HttpClient(_) => "HTTP_CLIENT_ERROR",
        }
    }

    fn to_error_response(&self) -> ErrorResponse {
        let status = self.status_code();
        let (attempts, hint) = match self {
            AppError::UpstreamExhausted { attempts, hint, .. } => {
                (Some(attempts.clone()), Some(hint.clone()))
            }
            _ => (None, None),
        };

        ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            code: status.as_u16().to_string(),
            details: None,
            attempts,
            hint,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = self.to_error_response();

        tracing::error!("API Error: {} - {}", self.error_code(), self);

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_error_carries_attempts_and_hint() {
        let err = AppError::upstream_exhausted(
            "GET boletas/facturadas",
            vec![ForwardAttempt::status("http://a/boletas/facturadas", 404, false)],
            "check BACKEND_INTERNAL_URL",
        );
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let body = err.to_error_response();
        assert_eq!(body.attempts.as_ref().map(Vec::len), Some(1));
        assert_eq!(body.hint.as_deref(), Some("check BACKEND_INTERNAL_URL"));
        assert_eq!(body.code, "502");
    }

    #[test]
    fn test_recursion_maps_to_loop_detected() {
        let err = AppError::recursion("marker header present");
        assert_eq!(err.status_code().as_u16(), 508);
        assert!(err.to_error_response().attempts.is_none());
    }

    #[test]
    fn test_request_errors_are_client_errors() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::bad_request("x").error_code(), "BAD_REQUEST");
        assert_eq!(AppError::authentication("x").status_code(), StatusCode::UNAUTHORIZED);
    }
}
