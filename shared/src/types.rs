//! Common types shared by the proxy routes and the boletas store

use serde::{Deserialize, Serialize};

/// One delivery attempt against a candidate target, kept for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForwardAttempt {
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub html: bool,
}

impl ForwardAttempt {
    pub fn status(target: impl Into<String>, status: u16, html: bool) -> Self {
        Self {
            target: target.into(),
            status: Some(status),
            error: None,
            html,
        }
    }

    pub fn network_error(target: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            status: None,
            error: Some(error.into()),
            html: false,
        }
    }
}

/// Date range applied to both boletas lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoletasFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_desde: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_hasta: Option<String>,
}

impl BoletasFilters {
    /// Overlays the fields present in `patch` onto `self`.
    pub fn merged(&self, patch: &BoletasFilters) -> BoletasFilters {
        BoletasFilters {
            fecha_desde: patch.fecha_desde.clone().or_else(|| self.fecha_desde.clone()),
            fecha_hasta: patch.fecha_hasta.clone().or_else(|| self.fecha_hasta.clone()),
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(desde) = &self.fecha_desde {
            pairs.push(("fecha_desde", desde.clone()));
        }
        if let Some(hasta) = &self.fecha_hasta {
            pairs.push(("fecha_hasta", hasta.clone()));
        }
        pairs
    }
}

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub service: String,
    pub status: ServiceStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub backend_candidates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unhealthy,
}
