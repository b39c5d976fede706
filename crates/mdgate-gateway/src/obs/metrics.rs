//! In-process metrics registry for the gateway.
//!
//! Counter and histogram vectors with a label key set fixed at construction.
//! Each distinct label-value tuple gets its own atomic cell, created lazily on
//! first use in a `DashMap` and kept for the life of the process. Histogram
//! observations are stored in integer microseconds and rendered in seconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Prometheus text exposition format, version 0.0.4.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub const REQUESTS_TOTAL: &str = "market_data_requests_total";
pub const REQUEST_LATENCY_SECONDS: &str = "market_data_request_latency_seconds";
pub const PROVIDER_DURATION_SECONDS: &str = "market_data_provider_duration_seconds";
pub const SYMBOL_REQUESTS_TOTAL: &str = "stock_symbol_requests_total";
pub const ERRORS_TOTAL: &str = "market_data_errors_total";
pub const DRAINING: &str = "market_data_draining";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_str(keys: &[&str], values: &[String]) -> String {
    keys.iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build an owned map key, or `None` (logged) on arity mismatch.
fn label_key(name: &str, keys: &[&str], values: &[&str]) -> Option<Vec<String>> {
    if keys.len() != values.len() {
        tracing::warn!(
            metric = name,
            expected = keys.len(),
            got = values.len(),
            "label value count mismatch; update dropped"
        );
        return None;
    }
    Some(values.iter().map(|v| v.to_string()).collect())
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

pub struct CounterVec {
    name: &'static str,
    help: &'static str,
    label_keys: &'static [&'static str],
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(name: &'static str, help: &'static str, label_keys: &'static [&'static str]) -> Self {
        Self { name, help, label_keys, map: DashMap::new() }
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) {
        self.add(values, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, values: &[&str], v: u64) {
        let Some(key) = label_key(self.name, self.label_keys, values) else { return; };

        // Read lock first; the shard write lock is only taken on first use.
        if let Some(counter) = self.map.get(&key) {
            counter.fetch_add(v, Ordering::Relaxed);
            return;
        }
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for a label tuple (0 if never touched).
    pub fn get(&self, values: &[&str]) -> u64 {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map.get(&key).map(|c| c.load(Ordering::Relaxed)).unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, out: &mut String) {
        write_header(out, self.name, self.help, "counter");
        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (values, val) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", self.name, label_str(self.label_keys, &values), val);
        }
    }
}

// Bucket upper bounds in microseconds:
// 5ms, 10ms, 25ms, 50ms, 75ms, 100ms, 250ms, 500ms, 750ms, 1s, 2.5s, 5s, 7.5s, 10s
const BUCKETS_MICROS: [u64; 14] = [
    5_000, 10_000, 25_000, 50_000, 75_000, 100_000, 250_000, 500_000, 750_000,
    1_000_000, 2_500_000, 5_000_000, 7_500_000, 10_000_000,
];

fn micros_as_secs(micros: u64) -> String {
    format!("{:?}", micros as f64 / 1_000_000.0)
}

struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; BUCKETS_MICROS.len()],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0),
            buckets: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }
}

impl AtomicHistogram {
    fn observe(&self, micros: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(micros, Ordering::Relaxed);

        // Cumulative buckets: bump every bucket whose bound covers the value.
        for (i, &b) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

pub struct HistogramVec {
    name: &'static str,
    help: &'static str,
    label_keys: &'static [&'static str],
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl HistogramVec {
    pub fn new(name: &'static str, help: &'static str, label_keys: &'static [&'static str]) -> Self {
        Self { name, help, label_keys, map: DashMap::new() }
    }

    /// Observe a duration (microsecond resolution).
    pub fn observe(&self, values: &[&str], duration: Duration) {
        let Some(key) = label_key(self.name, self.label_keys, values) else { return; };
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        if let Some(hist) = self.map.get(&key) {
            hist.observe(micros);
            return;
        }
        let hist = self.map.entry(key).or_insert_with(AtomicHistogram::default);
        hist.observe(micros);
    }

    /// Number of observations for a label tuple (0 if never touched).
    pub fn sample_count(&self, values: &[&str]) -> u64 {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map.get(&key).map(|h| h.count.load(Ordering::Relaxed)).unwrap_or(0)
    }

    /// Render in Prometheus text exposition format (unit: seconds).
    fn render(&self, out: &mut String) {
        write_header(out, self.name, self.help, "histogram");
        let mut keys: Vec<Vec<String>> = self.map.iter().map(|r| r.key().clone()).collect();
        keys.sort();

        for values in keys {
            let Some(hist) = self.map.get(&values) else { continue; };
            let labels = label_str(self.label_keys, &values);
            let prefix = if labels.is_empty() { String::new() } else { format!("{},", labels) };

            for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{}_bucket{{{}le=\"{}\"}} {}", self.name, prefix, micros_as_secs(le), count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", self.name, prefix, count);

            let sum = hist.sum.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_sum{{{}}} {}", self.name, labels, micros_as_secs(sum));
            let _ = writeln!(out, "{}_count{{{}}} {}", self.name, labels, count);
        }
    }
}

/// Process-wide metric series for the market-data gateway.
///
/// Created once at startup and shared by reference (`Arc`) with the request
/// middleware, the instrumented provider, and the handlers. Tests build their
/// own isolated instance.
pub struct MarketDataMetrics {
    pub requests: CounterVec,
    pub request_latency: HistogramVec,
    pub provider_duration: HistogramVec,
    pub symbol_requests: CounterVec,
    pub errors: CounterVec,
    draining: AtomicBool,
}

impl Default for MarketDataMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataMetrics {
    pub fn new() -> Self {
        Self {
            requests: CounterVec::new(REQUESTS_TOTAL, "Total number of requests by endpoint", &["endpoint"]),
            request_latency: HistogramVec::new(REQUEST_LATENCY_SECONDS, "Request latency in seconds", &["endpoint"]),
            provider_duration: HistogramVec::new(
                PROVIDER_DURATION_SECONDS,
                "Market data provider call duration in seconds",
                &["operation"],
            ),
            symbol_requests: CounterVec::new(SYMBOL_REQUESTS_TOTAL, "Number of requests by stock symbol", &["symbol"]),
            errors: CounterVec::new(ERRORS_TOTAL, "Total number of errors by type", &["error_type"]),
            draining: AtomicBool::new(false),
        }
    }

    /// Count one request for a ticker symbol.
    pub fn track_symbol(&self, symbol: &str) {
        self.symbol_requests.inc(&[symbol]);
    }

    /// Mark draining state.
    pub fn set_draining(&self) { self.draining.store(true, Ordering::Relaxed); }
    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool { self.draining.load(Ordering::Relaxed) }

    /// Render every registered series. No reset, no filtering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.requests.render(&mut out);
        self.request_latency.render(&mut out);
        self.provider_duration.render(&mut out);
        self.symbol_requests.render(&mut out);
        self.errors.render(&mut out);

        write_header(&mut out, DRAINING, "1 while the gateway is shutting down", "gauge");
        let _ = writeln!(out, "{} {}", DRAINING, if self.is_draining() { 1 } else { 0 });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_renders_per_label_lines() {
        let c = CounterVec::new("t_total", "test", &["symbol"]);
        c.inc(&["MSFT"]);
        c.add(&["AAPL"], 3);
        let mut out = String::new();
        c.render(&mut out);
        assert_eq!(
            out,
            "# HELP t_total test\n# TYPE t_total counter\nt_total{symbol=\"AAPL\"} 3\nt_total{symbol=\"MSFT\"} 1\n"
        );
    }

    #[test]
    fn arity_mismatch_is_dropped() {
        let c = CounterVec::new("t_total", "test", &["endpoint"]);
        c.inc(&[]);
        c.inc(&["/a", "/b"]);
        assert!(c.map.is_empty());
    }

    #[test]
    fn label_values_are_escaped() {
        let c = CounterVec::new("t_total", "test", &["endpoint"]);
        c.inc(&["/a\"b\\c"]);
        let mut out = String::new();
        c.render(&mut out);
        assert!(out.contains(r#"t_total{endpoint="/a\"b\\c"} 1"#));
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let h = HistogramVec::new("t_seconds", "test", &["operation"]);
        h.observe(&["get_price"], Duration::from_millis(3));
        h.observe(&["get_price"], Duration::from_millis(60));
        h.observe(&["get_price"], Duration::from_secs(30));

        let mut out = String::new();
        h.render(&mut out);
        assert!(out.contains("t_seconds_bucket{operation=\"get_price\",le=\"0.005\"} 1\n"));
        assert!(out.contains("t_seconds_bucket{operation=\"get_price\",le=\"0.05\"} 1\n"));
        assert!(out.contains("t_seconds_bucket{operation=\"get_price\",le=\"0.075\"} 2\n"));
        assert!(out.contains("t_seconds_bucket{operation=\"get_price\",le=\"10.0\"} 2\n"));
        assert!(out.contains("t_seconds_bucket{operation=\"get_price\",le=\"+Inf\"} 3\n"));
        assert!(out.contains("t_seconds_sum{operation=\"get_price\"} 30.063\n"));
        assert!(out.contains("t_seconds_count{operation=\"get_price\"} 3\n"));
        assert_eq!(h.sample_count(&["get_price"]), 3);
        assert_eq!(h.sample_count(&["get_info"]), 0);
    }

    #[test]
    fn registry_renders_all_series_even_when_empty() {
        let m = MarketDataMetrics::new();
        let out = m.render();
        for name in [REQUESTS_TOTAL, REQUEST_LATENCY_SECONDS, PROVIDER_DURATION_SECONDS, SYMBOL_REQUESTS_TOTAL, ERRORS_TOTAL] {
            assert!(out.contains(&format!("# TYPE {name} ")), "missing {name}");
        }
        assert!(out.ends_with("market_data_draining 0\n"));
        m.set_draining();
        assert!(m.render().ends_with("market_data_draining 1\n"));
    }
}
