//! mdgate core: provider-agnostic market-data types and the shared error type.
//!
//! This crate defines the request parameters, result shapes, and error surface
//! shared by the gateway and any provider implementation. It carries no HTTP
//! or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths must surface as `MdGateError`/`Result` so a malformed
//! ticker or parameter never takes the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;

/// Shared result type.
pub use error::{Result, MdGateError};
