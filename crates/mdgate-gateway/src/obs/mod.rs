//! Observability: metric registry, request middleware, provider call timing.
//!
//! Metrics are stored as atomics and rendered in Prometheus text format by
//! the scrape handler in `ops`.

pub mod metrics;
pub mod middleware;
pub mod timer;

pub use metrics::MarketDataMetrics;
pub use middleware::{track_request, track_requests, Failure, FailureKind, RequestContext};
pub use timer::{time_operation, OperationTimer};
