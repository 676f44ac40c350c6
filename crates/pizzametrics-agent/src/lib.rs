//! pizzametrics agent library entry.
//!
//! Wires the counter store, host sampler, HTTP transport and periodic reporter
//! together, and exposes the axum pieces (request-tracking middleware and
//! operational routes) a hosting service mounts. It is consumed by the binary
//! (`main.rs`), by hosting services, and by integration tests.

pub mod aggregator;
pub mod app_state;
pub mod config;
pub mod middleware;
pub mod obs;
pub mod ops;
pub mod reporter;
pub mod router;
pub mod sampler;
pub mod transport;

pub use aggregator::{MetricsAggregator, MetricsState};
pub use reporter::{FlushReport, Reporter, ReporterHandle};
pub use sampler::{ResourceUsage, SystemSampler};
pub use transport::Transport;
