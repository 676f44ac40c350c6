//! Wire formats.
//!
//! Only the line protocol is spoken today: one text line per measurement,
//! pushed as a raw HTTP body. The encoder is panic-free; malformed input is
//! reported as `MetricsError::Encode`.

pub mod line;
