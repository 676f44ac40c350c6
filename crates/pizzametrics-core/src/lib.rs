//! pizzametrics core: runtime-free primitives shared by the agent and by
//! request-handling code.
//!
//! This crate defines the ingestion event types, the line-protocol encoder and
//! the error surface. It carries no transport or runtime dependencies so the
//! encoder can be reused (and tested) without tokio.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `MetricsError`/`Result` because the
//! callers sit on the hot path of request handling.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod event;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorKind, MetricsError, Result};
pub use event::{HttpMethod, Order, OrderItem};
pub use protocol::line::{FieldValue, Measurement};
