//! Liveness endpoint

use axum::{Json, extract::State as AxumState, response::IntoResponse};
use serde_json::json;

use crate::SharedState;

/// GET /healthz
pub async fn healthz(AxumState(state): AxumState<SharedState>) -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "started_at": state.started_at,
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "webhook_configured": state.config.webhook_url().is_some(),
    }))
}
