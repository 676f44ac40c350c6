//! Top-level facade crate for pizzametrics.
//!
//! Re-exports core types and the agent library so hosting services can depend
//! on a single crate.

pub mod core {
    pub use pizzametrics_core::*;
}

pub mod agent {
    pub use pizzametrics_agent::*;
}
