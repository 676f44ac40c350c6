use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use pizzametrics_core::error::{MetricsError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub version: u32,

    pub metrics: MetricsSection,

    #[serde(default)]
    pub agent: AgentSection,
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::UnsupportedVersion);
        }

        self.metrics.validate()?;

        Ok(())
    }
}

/// Where and how often measurements are pushed.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Line-protocol ingestion URL.
    pub url: String,

    /// Value of the `source` tag carried by every measurement.
    pub source: String,

    pub user_id: String,

    pub api_key: String,

    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    #[serde(default = "default_push_timeout_ms")]
    pub push_timeout_ms: u64,
}

impl fmt::Debug for MetricsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsSection")
            .field("url", &self.url)
            .field("source", &self.source)
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .field("period_ms", &self.period_ms)
            .field("push_timeout_ms", &self.push_timeout_ms)
            .finish()
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(MetricsError::Config(
                "metrics.url must start with http:// or https://".into(),
            ));
        }
        if self.source.is_empty() || self.source.chars().any(char::is_whitespace) {
            return Err(MetricsError::Config(
                "metrics.source must be non-empty and contain no whitespace".into(),
            ));
        }
        if self.source.ends_with('\\') {
            return Err(MetricsError::Config(
                "metrics.source must not end with a backslash".into(),
            ));
        }
        if self.user_id.is_empty() || self.api_key.is_empty() {
            return Err(MetricsError::Config(
                "metrics.user_id and metrics.api_key must not be empty".into(),
            ));
        }
        if !(100..=3_600_000).contains(&self.period_ms) {
            return Err(MetricsError::Config(
                "metrics.period_ms must be between 100 and 3600000".into(),
            ));
        }
        if !(100..=60_000).contains(&self.push_timeout_ms) {
            return Err(MetricsError::Config(
                "metrics.push_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if self.push_timeout_ms >= self.period_ms {
            return Err(MetricsError::Config(
                "metrics.push_timeout_ms must be less than period_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }

    /// `Authorization` header value for the ingestion endpoint.
    pub fn authorization(&self) -> String {
        format!("Bearer {}:{}", self.user_id, self.api_key)
    }
}

fn default_period_ms() -> u64 {
    6000
}
fn default_push_timeout_ms() -> u64 {
    3000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentSection {
    /// Parsed while deserializing, so a bad address fails the load.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}
