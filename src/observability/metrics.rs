// ============================================================================
// PROMETHEUS METRICS - Proxy observability
// ============================================================================
// Counters for inbound requests and for every upstream delivery attempt.
// ============================================================================

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

lazy_static! {
    // ========================================================================
    // HTTP REQUEST METRICS
    // ========================================================================

    /// Total de requests HTTP por método, endpoint y status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "endpoint", "status"]
    )
    .unwrap();

    /// Duración de requests HTTP en segundos
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "endpoint"],
        vec![0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 15.0, 30.0]
    )
    .unwrap();

    // ========================================================================
    // UPSTREAM FORWARDING METRICS
    // ========================================================================

    /// Intentos contra cada candidato, por resultado
    /// (authoritative, routing, html, network)
    pub static ref UPSTREAM_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "upstream_attempts_total",
        "Upstream delivery attempts by outcome",
        &["outcome"]
    )
    .unwrap();

    /// Operaciones sin ningún candidato válido
    pub static ref UPSTREAM_EXHAUSTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "upstream_exhausted_total",
        "Forwarded operations where every candidate failed",
        &["resource"]
    )
    .unwrap();

    /// Requests rechazadas por bucle de proxy
    pub static ref PROXY_LOOP_REJECTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "proxy_loop_rejections_total",
        "Requests rejected because they would loop through the proxy",
        &["reason"]
    )
    .unwrap();
}

pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration_secs);
}

pub fn record_upstream_attempt(outcome: &str) {
    UPSTREAM_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_upstream_exhausted(resource: &str) {
    UPSTREAM_EXHAUSTED_TOTAL.with_label_values(&[resource]).inc();
}

pub fn record_loop_rejection(reason: &str) {
    PROXY_LOOP_REJECTIONS_TOTAL.with_label_values(&[reason]).inc();
}
