//! Shared error type across pizzametrics crates.

use thiserror::Error;

/// Stable error classification used in log fields and counter labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid or unreadable configuration.
    Config,
    /// Unsupported configuration version.
    UnsupportedVersion,
    /// A measurement could not be encoded.
    Encode,
    /// Network-level push failure.
    Transport,
    /// The ingestion endpoint answered with a non-2xx status.
    Rejected,
    /// The push did not complete within its deadline.
    Timeout,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorKind::Encode => "ENCODE",
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::Rejected => "REJECTED",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and agent.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("encode: {0}")]
    Encode(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("ingestion endpoint returned status {0}")]
    Status(u16),
    #[error("push timed out")]
    Timeout,
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Map the error to its stable classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetricsError::Config(_) => ErrorKind::Config,
            MetricsError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            MetricsError::Encode(_) => ErrorKind::Encode,
            MetricsError::Transport(_) => ErrorKind::Transport,
            MetricsError::Status(_) => ErrorKind::Rejected,
            MetricsError::Timeout => ErrorKind::Timeout,
            MetricsError::Internal(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_rejected() {
        let e = MetricsError::Status(503);
        assert_eq!(e.kind(), ErrorKind::Rejected);
        assert_eq!(e.kind().as_str(), "REJECTED");
        assert_eq!(e.to_string(), "ingestion endpoint returned status 503");
    }
}
