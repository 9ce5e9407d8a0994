//! Prometheus exposition endpoint.

use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;

/// Render all recorded metrics in the Prometheus text format.
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
