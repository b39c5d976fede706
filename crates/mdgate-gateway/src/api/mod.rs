//! Market-data HTTP handlers and their error mapping.

pub mod error;
pub mod stocks;

pub use error::{ApiError, ApiResult};
