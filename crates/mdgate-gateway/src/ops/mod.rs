//! Operational HTTP endpoints.
//!
//! - `/`        : status payload (`online` + timestamp)
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining)
//! - metrics    : Prometheus text format, path from `metrics.path`

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::app_state::AppState;
use crate::obs::metrics::CONTENT_TYPE;

pub async fn status() -> impl IntoResponse {
    Json(json!({
        "status": "online",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        body,
    )
        .into_response()
}
