//! Scoped timing for outbound provider calls.

use std::future::Future;
use std::time::Instant;

use crate::obs::metrics::{HistogramVec, MarketDataMetrics};

/// RAII timer for one external operation.
///
/// The observation is recorded in `Drop`, so it lands exactly once on every
/// exit path: normal return, error return, panic unwind, or the owning future
/// being dropped mid-flight.
#[must_use = "the timer records when dropped; binding it to `_` stops it immediately"]
pub struct OperationTimer<'a> {
    histogram: &'a HistogramVec,
    operation: &'a str,
    started: Instant,
}

impl<'a> OperationTimer<'a> {
    pub fn start(histogram: &'a HistogramVec, operation: &'a str) -> Self {
        Self { histogram, operation, started: Instant::now() }
    }

    pub fn operation(&self) -> &str {
        self.operation
    }
}

impl Drop for OperationTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        self.histogram.observe(&[self.operation], elapsed);
        tracing::debug!(operation = self.operation, elapsed_ms = elapsed.as_millis() as u64, "provider call finished");
    }
}

impl MarketDataMetrics {
    /// Start timing a provider operation; records into the provider duration series.
    pub fn start_operation<'a>(&'a self, operation: &'a str) -> OperationTimer<'a> {
        OperationTimer::start(&self.provider_duration, operation)
    }
}

/// Run `fut` under an [`OperationTimer`] labeled `operation`.
///
/// The output (success or error) passes through untouched.
pub async fn time_operation<F>(metrics: &MarketDataMetrics, operation: &str, fut: F) -> F::Output
where
    F: Future,
{
    let _timer = metrics.start_operation(operation);
    fut.await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn records_once_on_success_and_error() {
        let m = MarketDataMetrics::new();

        let ok: Result<u32, &str> = time_operation(&m, "get_price", async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));
        let err: Result<u32, &str> = time_operation(&m, "get_price", async { Err("boom") }).await;
        assert_eq!(err, Err("boom"));

        assert_eq!(m.provider_duration.sample_count(&["get_price"]), 2);
    }

    #[tokio::test]
    async fn records_when_cancelled() {
        let m = MarketDataMetrics::new();
        let slow = time_operation(&m, "get_history", tokio::time::sleep(Duration::from_secs(60)));
        let res = tokio::time::timeout(Duration::from_millis(10), slow).await;
        assert!(res.is_err());
        assert_eq!(m.provider_duration.sample_count(&["get_history"]), 1);
    }

    #[test]
    fn guard_records_on_drop() {
        let m = MarketDataMetrics::new();
        {
            let t = m.start_operation("get_info");
            assert_eq!(t.operation(), "get_info");
        }
        assert_eq!(m.provider_duration.sample_count(&["get_info"]), 1);
    }
}
