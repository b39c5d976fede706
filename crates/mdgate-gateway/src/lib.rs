//! mdgate gateway library entry.
//!
//! Wires config, the instrumented market-data provider, the HTTP handlers,
//! and the metrics layer into one axum router. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod provider;
pub mod router;
