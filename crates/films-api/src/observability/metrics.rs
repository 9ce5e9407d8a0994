//! Metrics definitions for the Films API.
//!
//! Names follow Prometheus conventions: `films_` prefix, `_total` suffix
//! for counters, `_seconds` suffix for duration histograms.
//!
//! # Cardinality
//!
//! - `method`: bounded by HTTP methods
//! - `endpoint`: route templates (`/movie/{id}`), unknown paths are `/other`
//! - `status`: success, error, timeout
//! - `outcome`: bounded by token verification outcomes

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle used to render
/// the `/metrics` endpoint.
///
/// # Errors
///
/// Returns error if the recorder cannot be installed (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("films_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record HTTP request completion
///
/// Metric: `films_http_requests_total`, `films_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let endpoint = normalize_endpoint(path);
    let status = categorize_status_code(status_code);

    histogram!("films_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("films_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Record a token verification outcome
///
/// Metric: `films_token_validations_total`
/// Labels: `outcome` (valid, expired, invalid, claim_shape)
pub fn record_token_validation(outcome: &'static str) {
    counter!("films_token_validations_total", "outcome" => outcome).increment(1);
}

fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Map a request path onto its route template.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/movies" => "/movies",
        "/movie" => "/movie",
        "/favourite" => "/favourite",
        "/favourites" => "/favourites",
        "/user/signup" => "/user/signup",
        "/user/login" => "/user/login",
        _ if is_single_segment_under(path, "/movie/") => "/movie/{id}",
        _ if is_single_segment_under(path, "/favourites/") => "/favourites/{id}",
        _ => "/other",
    }
}

fn is_single_segment_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
}
