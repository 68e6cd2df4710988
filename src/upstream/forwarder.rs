use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use reqwest::Client;
use serde_json::Value;
use shared::{
    classify::{classify_response, Classified},
    utils::{authority_of, normalize_host_header, sanitize_filename},
    AppError, BackendConfig, ForwardAttempt, Result,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use super::candidates::{BackendCandidates, Target};
use crate::observability::{
    normalize_path, record_loop_rejection, record_upstream_attempt, record_upstream_exhausted,
};

/// Stamped on every outbound request; an inbound request carrying it came
/// from this proxy and must not be forwarded again.
pub const PROXY_HOP_HEADER: &str = "x-ima-proxy-hop";

#[derive(Debug, Clone, Default)]
pub enum ForwardBody {
    #[default]
    Empty,
    Json(Value),
    Raw {
        bytes: Bytes,
        content_type: Option<String>,
    },
}

/// One logical operation to deliver to the backend.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub resource: String,
    pub query: Option<String>,
    pub authorization: Option<HeaderValue>,
    /// `Host` header of the inbound request, for self-call avoidance.
    pub inbound_host: Option<String>,
    pub body: ForwardBody,
    pub try_api_prefix: bool,
    /// Set for download routes; binary answers get an attachment disposition.
    pub download_name: Option<String>,
}

impl ForwardRequest {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        Self {
            method,
            resource: resource.into(),
            query: None,
            authorization: None,
            inbound_host: None,
            body: ForwardBody::Empty,
            try_api_prefix: true,
            download_name: None,
        }
    }

    pub fn query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn authorization(mut self, authorization: Option<HeaderValue>) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn inbound_host(mut self, host: Option<String>) -> Self {
        self.inbound_host = host.map(|h| normalize_host_header(&h));
        self
    }

    pub fn body(mut self, body: ForwardBody) -> Self {
        self.body = body;
        self
    }

    pub fn bare_only(mut self) -> Self {
        self.try_api_prefix = false;
        self
    }

    pub fn download(mut self, filename: impl Into<String>) -> Self {
        self.download_name = Some(filename.into());
        self
    }

    fn label(&self) -> String {
        format!("{} {}", self.method, self.resource)
    }
}

/// First authoritative answer from a candidate, relayed verbatim.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub target: String,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Classified,
    pub raw: Bytes,
    pub download_name: Option<String>,
}

#[derive(Debug)]
pub enum ForwardOutcome {
    Authoritative(UpstreamResponse),
    Exhausted {
        attempts: Vec<ForwardAttempt>,
        skipped_self_calls: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    candidates: Arc<BackendCandidates>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self::with_client(
            client,
            BackendCandidates::from_config(config),
            Duration::from_secs(config.timeout_seconds),
        ))
    }

    pub fn with_client(client: Client, candidates: BackendCandidates, timeout: Duration) -> Self {
        Self {
            client,
            candidates: Arc::new(candidates),
            timeout,
        }
    }

    pub fn candidates(&self) -> &BackendCandidates {
        &self.candidates
    }

    /// Longest a single operation can take: every target of every base
    /// running into the per-attempt timeout.
    pub fn worst_case_duration(&self) -> Duration {
        self.timeout * (self.candidates.bases().len() as u32 * 2)
    }

    fn is_self_call(target: &Target, inbound_host: Option<&str>) -> bool {
        match inbound_host {
            Some(host) if !target.trusted => authority_of(&target.url).as_deref() == Some(host),
            _ => false,
        }
    }

    fn encode_body(body: &ForwardBody) -> Option<(Bytes, String)> {
        match body {
            ForwardBody::Empty => None,
            ForwardBody::Json(value) => Some((Bytes::from(value.to_string()), "application/json".to_string())),
            ForwardBody::Raw { bytes, content_type } => Some((
                bytes.clone(),
                content_type.clone().unwrap_or_else(|| "application/octet-stream".to_string()),
            )),
        }
    }

    fn describe_network_error(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!("timeout after {}s", self.timeout.as_secs())
        } else if error.is_connect() {
            format!("connection failed: {}", error)
        } else {
            error.to_string()
        }
    }

    /// Tries every target in order and stops at the first answer that is
    /// neither HTML nor 404/405. Candidates are never raced.
    pub async fn send(&self, request: &ForwardRequest) -> ForwardOutcome {
        let payload = Self::encode_body(&request.body);
        let mut attempts = Vec::new();
        let mut skipped_self_calls = 0;

        for target in self.candidates.targets(&request.resource, request.try_api_prefix) {
            if Self::is_self_call(&target, request.inbound_host.as_deref()) {
                warn!("↩️ Skipping {}: same host as the inbound request", target.url);
                skipped_self_calls += 1;
                continue;
            }

            let url = match &request.query {
                Some(query) => format!("{}?{}", target.url, query),
                None => target.url.clone(),
            };

            let mut builder = self
                .client
                .request(request.method.clone(), &url)
                .timeout(self.timeout)
                .header(PROXY_HOP_HEADER, "1");
            if let Some(auth) = &request.authorization {
                builder = builder.header(AUTHORIZATION, auth.clone());
            }
            if let Some((bytes, content_type)) = &payload {
                builder = builder.header(CONTENT_TYPE, content_type.as_str()).body(bytes.clone());
            }

            debug!("➡️ {} {}", request.method, url);
            let response = match builder.send().await {
                Ok(response) => response,
                Err(e) => {
                    let reason = self.describe_network_error(&e);
                    warn!("🔌 {} {} failed: {}", request.method, url, reason);
                    record_upstream_attempt("network");
                    attempts.push(ForwardAttempt::network_error(url, reason));
                    continue;
                }
            };

            let status = response.status();
            let header_str = |name| {
                response
                    .headers()
                    .get(name)
                    .and_then(|v: &HeaderValue| v.to_str().ok())
                    .map(str::to_string)
            };
            let content_type = header_str(CONTENT_TYPE);
            let content_disposition = header_str(CONTENT_DISPOSITION);

            let raw = match response.bytes().await {
                Ok(raw) => raw,
                Err(e) => {
                    let reason = self.describe_network_error(&e);
                    warn!("🔌 Reading body from {} failed: {}", url, reason);
                    record_upstream_attempt("network");
                    attempts.push(ForwardAttempt::network_error(url, reason));
                    continue;
                }
            };

            let body = classify_response(&raw, content_type.as_deref());
            if body.is_html() {
                warn!("🧾 {} answered HTML with status {}; base looks misconfigured", url, status);
                record_upstream_attempt("html");
                attempts.push(ForwardAttempt::status(url, status.as_u16(), true));
                continue;
            }

            if status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED {
                debug!("🚫 {} not mounted at {} ({})", request.resource, url, status);
                record_upstream_attempt("routing");
                attempts.push(ForwardAttempt::status(url, status.as_u16(), false));
                continue;
            }

            info!("✅ {} answered by {} with {}", request.label(), url, status);
            record_upstream_attempt("authoritative");
            return ForwardOutcome::Authoritative(UpstreamResponse {
                status,
                target: url,
                content_type,
                content_disposition,
                body,
                raw,
                download_name: request.download_name.clone(),
            });
        }

        ForwardOutcome::Exhausted {
            attempts,
            skipped_self_calls,
        }
    }

    /// Like [`Forwarder::send`], turning exhaustion into the diagnostic error.
    pub async fn forward(&self, request: ForwardRequest) -> Result<UpstreamResponse> {
        match self.send(&request).await {
            ForwardOutcome::Authoritative(response) => Ok(response),
            ForwardOutcome::Exhausted {
                attempts,
                skipped_self_calls,
            } => {
                if attempts.is_empty() && skipped_self_calls > 0 {
                    record_loop_rejection("self_call");
                    return Err(AppError::recursion(
                        "every backend candidate resolves to this front server",
                    ));
                }
                record_upstream_exhausted(&normalize_path(&request.resource));
                let hint = remediation_hint(&attempts, skipped_self_calls);
                Err(AppError::upstream_exhausted(request.label(), attempts, hint))
            }
        }
    }
}

/// Human hint attached to the exhaustion payload.
pub fn remediation_hint(attempts: &[ForwardAttempt], skipped_self_calls: usize) -> String {
    let mut hints = Vec::new();

    if attempts.iter().any(|a| a.html) {
        hints.push(
            "A candidate answered with an HTML page; BACKEND_INTERNAL_URL or BACKEND_PUBLIC_URL probably points at a web front end instead of the API.",
        );
    }
    if attempts.iter().any(|a| a.error.is_some()) {
        hints.push(
            "Some candidates were unreachable; check that the backend is running and that BACKEND_LOCAL_FALLBACK is correct.",
        );
    }
    if attempts.iter().any(|a| matches!(a.status, Some(404) | Some(405))) {
        hints.push("Some candidates do not mount this route; check the backend version and its /api prefix.");
    }
    if skipped_self_calls > 0 {
        hints.push("Candidates on this server's own host were skipped; set BACKEND_INTERNAL_URL to the real backend.");
    }
    if hints.is_empty() {
        hints.push("No backend candidate is configured.");
    }

    hints.join(" ")
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        match self.body {
            Classified::Json(value) => (self.status, Json(value)).into_response(),
            Classified::Binary => {
                let content_type = self
                    .content_type
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let disposition = self.content_disposition.or_else(|| {
                    self.download_name
                        .as_deref()
                        .map(|name| format!("attachment; filename=\"{}\"", sanitize_filename(name)))
                });

                let mut response = Response::new(Body::from(self.raw));
                *response.status_mut() = self.status;
                if let Ok(value) = HeaderValue::from_str(&content_type) {
                    response.headers_mut().insert(CONTENT_TYPE, value);
                }
                if let Some(value) = disposition.and_then(|d| HeaderValue::from_str(&d).ok()) {
                    response.headers_mut().insert(CONTENT_DISPOSITION, value);
                }
                response
            }
            Classified::Text(_) | Classified::Html => {
                let content_type = self
                    .content_type
                    .unwrap_or_else(|| "text/plain; charset=utf-8".to_string());
                let mut response = Response::new(Body::from(self.raw));
                *response.status_mut() = self.status;
                if let Ok(value) = HeaderValue::from_str(&content_type) {
                    response.headers_mut().insert(CONTENT_TYPE, value);
                }
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_call_only_for_untrusted_targets() {
        let public = Target { url: "http://front.ima.cl/empresas".to_string(), trusted: false };
        let internal = Target { url: "http://front.ima.cl/empresas".to_string(), trusted: true };

        assert!(Forwarder::is_self_call(&public, Some("front.ima.cl")));
        assert!(!Forwarder::is_self_call(&internal, Some("front.ima.cl")));
        assert!(!Forwarder::is_self_call(&public, Some("front.ima.cl:3000")));
        assert!(!Forwarder::is_self_call(&public, None));
    }

    #[test]
    fn test_remediation_hint_mentions_html_and_network() {
        let attempts = vec![
            ForwardAttempt::status("http://a/x", 200, true),
            ForwardAttempt::network_error("http://b/x", "connection failed"),
        ];
        let hint = remediation_hint(&attempts, 0);
        assert!(hint.contains("HTML page"));
        assert!(hint.contains("unreachable"));
        assert!(!hint.contains("do not mount"));
    }

    #[test]
    fn test_binary_response_gets_attachment_disposition() {
        let upstream = UpstreamResponse {
            status: StatusCode::OK,
            target: "http://a/facturas/9/pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            content_disposition: None,
            body: Classified::Binary,
            raw: Bytes::from_static(b"%PDF-1.7"),
            download_name: Some("factura-9.pdf".to_string()),
        };

        let response = upstream.into_response();
        assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"factura-9.pdf\""
        );
    }

    #[test]
    fn test_binary_without_download_name_has_no_disposition() {
        let upstream = UpstreamResponse {
            status: StatusCode::OK,
            target: "http://a/empresas/3/logo".to_string(),
            content_type: Some("image/png".to_string()),
            content_disposition: None,
            body: Classified::Binary,
            raw: Bytes::from_static(b"\x89PNG"),
            download_name: None,
        };

        let response = upstream.into_response();
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
        assert!(response.headers().get(CONTENT_DISPOSITION).is_none());
    }

    #[test]
    fn test_worst_case_covers_every_target() {
        let config = BackendConfig {
            internal_base: Some("http://a".to_string()),
            public_base: Some("http://b".to_string()),
            local_fallback: "http://c".to_string(),
            timeout_seconds: 15,
        };
        let forwarder = Forwarder::new(&config).unwrap();
        assert_eq!(forwarder.worst_case_duration(), Duration::from_secs(90));
    }

    #[test]
    fn test_json_body_is_only_encoded_once() {
        let body = ForwardBody::Json(serde_json::json!({"ids": [1, 2]}));
        let (bytes, content_type) = Forwarder::encode_body(&body).unwrap();
        assert_eq!(content_type, "application/json");
        assert_eq!(&bytes[..], br#"{"ids":[1,2]}"#);
        assert!(Forwarder::encode_body(&ForwardBody::Empty).is_none());
    }
}
