//! Top-level facade crate for GenMetr.
//!
//! Re-exports the metrics core and the gateway library so users can depend on a single crate.

pub mod core {
    pub use genmetr_core::*;
}

pub mod gateway {
    pub use genmetr_gateway::*;
}
