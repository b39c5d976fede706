//! Axum router wiring.
//!
//! Every route, including the metrics scrape, runs under the request
//! instrumentation middleware.

use axum::{middleware, routing::get, Router};

use crate::{api::stocks, app_state::AppState, obs, ops};

pub fn build_router(state: AppState) -> Router {
    let metrics_path = state.cfg().metrics.path.clone();

    Router::new()
        .route("/", get(ops::status))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route(&metrics_path, get(ops::metrics))
        .route("/stock/:ticker/price", get(stocks::price))
        .route("/stock/:ticker/historical", get(stocks::historical))
        .route("/stock/:ticker/info", get(stocks::info))
        .route("/stock/:ticker/dividends", get(stocks::dividends))
        .route("/stock/:ticker/earnings", get(stocks::earnings))
        .route("/stocks/batch", get(stocks::batch))
        .layer(middleware::from_fn_with_state(state.metrics(), obs::track_requests))
        .with_state(state)
}
