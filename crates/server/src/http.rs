//! HTTP Endpoints
//!
//! `POST /respond` takes `{"dialogs": [...]}` and returns one
//! `[skill_name, text, confidence, human_attributes, bot_attributes]` array
//! per dialogue, in request order.

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use response_selector_core::{Dialogue, Selection};

use crate::metrics::{metrics_handler, record_request};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/respond", post(respond))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// `/respond` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondRequest {
    pub dialogs: Vec<Dialogue>,
}

async fn respond(
    State(state): State<AppState>,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<Vec<Selection>>, ServerError> {
    let result = select(&state, payload).await;
    record_request(match &result {
        Ok(_) => StatusCode::OK,
        Err(ServerError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
    });
    result
}

async fn select(
    state: &AppState,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> Result<Json<Vec<Selection>>, ServerError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed /respond body");
        ServerError::InvalidRequest(e.body_text())
    })?;

    for (index, dialog) in request.dialogs.iter().enumerate() {
        dialog
            .validate(index)
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
    }

    let selections = state.selector.respond(&request.dialogs).await;
    Ok(Json(selections))
}

/// Liveness: the process is up
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness: reports the configured upstream endpoints
///
/// Upstreams are not probed; an unreachable service only degrades scoring.
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let services = &state.config.services;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ready",
            "services": {
                "toxicity": services.toxicity_url,
                "blacklist": services.blacklist_url,
                "evaluator": services.evaluator_url,
            },
            "timeout_secs": services.timeout_secs,
        })),
    )
}
