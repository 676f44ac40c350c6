//! Outbound push of encoded measurements.
//!
//! The reporter only depends on the `Transport` trait so tests can swap in a
//! recording or failing implementation.

pub mod http;

use async_trait::async_trait;

use pizzametrics_core::error::Result;

pub use http::HttpTransport;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Push one line-protocol line. Any non-2xx answer is an error.
    async fn push(&self, line: &str) -> Result<()>;
}
