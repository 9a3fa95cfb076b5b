//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use response_selector_config::Settings;
use response_selector_engine::ResponseSelector;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Validated settings, fixed for the process lifetime
    pub config: Arc<Settings>,
    pub selector: Arc<ResponseSelector>,
    /// Renders `/metrics`; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Settings, selector: ResponseSelector) -> Self {
        Self {
            config: Arc::new(config),
            selector: Arc::new(selector),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}
