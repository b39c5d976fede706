//! Top-level facade crate for mdgate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use mdgate_core::*;
}

pub mod gateway {
    pub use mdgate_gateway::*;
}
