//! Prometheus metrics
//!
//! The engine records through the `metrics` facade; this module installs the
//! global recorder and renders it for scraping.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Install the global Prometheus recorder
///
/// Fails if a recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Count a `/respond` request by response status
pub fn record_request(status: StatusCode) {
    metrics::counter!(
        "response_selector_requests_total",
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}
