//! Prometheus metrics for monitoring the contacts API.
//!
//! Metrics are exposed in Prometheus text format by a dedicated listener when
//! `METRICS_BIND` is configured. Without an installed exporter every recording
//! call is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cb_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/auth/login", 200);
//! metrics::login_attempts_total(true);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

/// Increment completed signups counter.
pub fn signups_total() {
    metrics::counter!("signups_total").increment(1);
}

/// Increment logouts counter.
pub fn logouts_total() {
    metrics::counter!("logouts_total").increment(1);
}

/// Increment rejected authorizations, labelled with the internal reason.
pub fn authorization_rejections_total(reason: &'static str) {
    metrics::counter!("authorization_rejections_total",
        "reason" => reason
    )
    .increment(1);
}
