//! Self-observability of the reporter.
//!
//! Push outcomes are counted in-process and rendered by the `/metrics`
//! handler, so a broken ingestion endpoint is visible without reading logs.

pub mod stats;

pub use stats::{CounterVec, ReporterStats};
