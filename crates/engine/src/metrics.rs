//! Selector metrics
//!
//! Recorded through the `metrics` facade; the server installs the Prometheus
//! recorder. Without a recorder every call is a no-op.

use std::time::Duration;

use response_selector_core::UpstreamService;

/// How a dialogue's reply was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Highest-scoring valid candidate
    Scored,
    /// Every candidate was unsafe (or none were offered)
    Apology,
    /// Repair loop ran out of valid candidates
    Degenerate,
}

impl SelectionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scored => "scored",
            Self::Apology => "apology",
            Self::Degenerate => "degenerate",
        }
    }
}

pub fn record_upstream_failure(service: UpstreamService, kind: &'static str) {
    metrics::counter!(
        "response_selector_upstream_failures_total",
        "service" => service.as_str(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_blacklisted_candidate() {
    metrics::counter!("response_selector_blacklisted_candidates_total").increment(1);
}

pub fn record_selection(outcome: SelectionOutcome) {
    metrics::counter!("response_selector_selections_total", "outcome" => outcome.as_str())
        .increment(1);
}

pub fn record_batch(candidates: usize, elapsed: Duration) {
    metrics::histogram!("response_selector_batch_seconds").record(elapsed.as_secs_f64());
    metrics::counter!("response_selector_candidates_total").increment(candidates as u64);
}
