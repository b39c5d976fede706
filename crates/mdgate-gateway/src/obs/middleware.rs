//! Per-request instrumentation.
//!
//! Every inbound request bumps the endpoint counter before the handler runs.
//! A successful response records latency; a failed one (a response tagged
//! with [`FailureKind`], any other 4xx/5xx response, or a panic) bumps the
//! error counter instead. The response or panic is always passed on unchanged.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;

use mdgate_core::MdGateError;

use crate::obs::metrics::MarketDataMetrics;

/// Failure-kind label recorded when a handler panics.
pub const PANIC_KIND: &str = "panic";
/// Untagged 404, e.g. no route matched.
pub const NOT_FOUND_KIND: &str = "not_found";
/// Untagged 4xx, e.g. an extractor rejected the path or query string.
pub const REJECTION_KIND: &str = "rejection";
/// Untagged 5xx.
pub const SERVER_ERROR_KIND: &str = "server_error";

/// Anything the request tracker can label in the error counter.
pub trait Failure {
    fn kind(&self) -> &str;
}

impl Failure for MdGateError {
    fn kind(&self) -> &str {
        MdGateError::kind(self)
    }
}

/// Response extension marking a response as the failure path of a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureKind(pub &'static str);

/// One inbound request in flight.
#[derive(Debug)]
pub struct RequestContext {
    endpoint: String,
    started: Instant,
}

impl RequestContext {
    /// Count the request and start its clock.
    pub fn begin(metrics: &MarketDataMetrics, endpoint: &str) -> Self {
        metrics.requests.inc(&[endpoint]);
        Self { endpoint: endpoint.to_string(), started: Instant::now() }
    }

    fn succeeded(self, metrics: &MarketDataMetrics) {
        let elapsed = self.started.elapsed();
        metrics.request_latency.observe(&[&self.endpoint], elapsed);
        tracing::debug!(endpoint = %self.endpoint, elapsed_ms = elapsed.as_millis() as u64, "request done");
    }

    fn failed(self, metrics: &MarketDataMetrics, kind: &str) {
        metrics.errors.inc(&[kind]);
        tracing::debug!(endpoint = %self.endpoint, error_type = kind, "request failed");
    }
}

/// Instrument one request-shaped future.
///
/// Panics inside `fut` are counted under [`PANIC_KIND`] and then resumed.
pub async fn track_request<F, T, E>(metrics: &MarketDataMetrics, endpoint: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Failure,
{
    let ctx = RequestContext::begin(metrics, endpoint);
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(v)) => {
            ctx.succeeded(metrics);
            Ok(v)
        }
        Ok(Err(e)) => {
            ctx.failed(metrics, e.kind());
            Err(e)
        }
        Err(panic) => {
            ctx.failed(metrics, PANIC_KIND);
            resume(panic)
        }
    }
}

fn resume(panic: Box<dyn Any + Send>) -> ! {
    std::panic::resume_unwind(panic)
}

/// Failure label for a response no handler tagged, by status class.
fn untagged_kind(status: StatusCode) -> Option<&'static str> {
    if status == StatusCode::NOT_FOUND {
        Some(NOT_FOUND_KIND)
    } else if status.is_client_error() {
        Some(REJECTION_KIND)
    } else if status.is_server_error() {
        Some(SERVER_ERROR_KIND)
    } else {
        None
    }
}

struct FailedResponse {
    kind: &'static str,
    response: Response,
}

impl Failure for FailedResponse {
    fn kind(&self) -> &str {
        self.kind
    }
}

/// Axum middleware wrapping every route with [`track_request`], labeled by raw path.
pub async fn track_requests(
    State(metrics): State<Arc<MarketDataMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let endpoint = req.uri().path().to_owned();

    let outcome = track_request(&metrics, &endpoint, async move {
        let response = next.run(req).await;
        let tagged = response.extensions().get::<FailureKind>().map(|k| k.0);
        match tagged.or_else(|| untagged_kind(response.status())) {
            Some(kind) => Err(FailedResponse { kind, response }),
            None => Ok(response),
        }
    })
    .await;

    match outcome {
        Ok(response) | Err(FailedResponse { response, .. }) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_counts_and_times() {
        let m = MarketDataMetrics::new();
        let out: Result<&str, MdGateError> = track_request(&m, "/", async { Ok("online") }).await;
        assert_eq!(out.ok(), Some("online"));
        assert_eq!(m.requests.get(&["/"]), 1);
        assert_eq!(m.request_latency.sample_count(&["/"]), 1);
        assert_eq!(m.errors.get(&["no_data"]), 0);
    }

    #[tokio::test]
    async fn failure_is_counted_and_passed_through() {
        let m = MarketDataMetrics::new();
        let out: Result<(), MdGateError> =
            track_request(&m, "/stock/ZZZ/historical", async { Err(MdGateError::NoData("ZZZ".into())) }).await;

        assert!(matches!(out, Err(MdGateError::NoData(ref s)) if s == "ZZZ"));
        assert_eq!(m.errors.get(&["no_data"]), 1);
        assert_eq!(m.requests.get(&["/stock/ZZZ/historical"]), 1);
        assert_eq!(m.request_latency.sample_count(&["/stock/ZZZ/historical"]), 0);
    }

    async fn buggy_handler() -> Result<(), MdGateError> {
        panic!("handler bug")
    }

    #[test]
    fn untagged_statuses_are_classified() {
        assert_eq!(untagged_kind(StatusCode::OK), None);
        assert_eq!(untagged_kind(StatusCode::NOT_MODIFIED), None);
        assert_eq!(untagged_kind(StatusCode::NOT_FOUND), Some(NOT_FOUND_KIND));
        assert_eq!(untagged_kind(StatusCode::BAD_REQUEST), Some(REJECTION_KIND));
        assert_eq!(untagged_kind(StatusCode::SERVICE_UNAVAILABLE), Some(SERVER_ERROR_KIND));
    }

    #[tokio::test]
    async fn panic_is_counted_and_resumed() {
        let m = Arc::new(MarketDataMetrics::new());
        let m2 = Arc::clone(&m);
        let joined = tokio::spawn(async move {
            let _ = track_request(&m2, "/boom", buggy_handler()).await;
        })
        .await;

        let err = joined.err().map(|e| e.is_panic());
        assert_eq!(err, Some(true));
        assert_eq!(m.errors.get(&[PANIC_KIND]), 1);
    }
}
