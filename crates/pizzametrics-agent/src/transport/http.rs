//! HTTP POST transport for a line-protocol ingestion endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use pizzametrics_core::error::{MetricsError, Result};

use super::Transport;
use crate::config::MetricsSection;

pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    authorization: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, authorization: impl Into<String>, timeout: Duration) -> Result<Self> {
        // Bounds every request sent through this client.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pizzametrics-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MetricsError::Internal(format!("http client build failed: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            authorization: authorization.into(),
        })
    }

    pub fn from_config(cfg: &MetricsSection) -> Result<Self> {
        Self::new(cfg.url.clone(), cfg.authorization(), cfg.push_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn push(&self, line: &str) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, &self.authorization)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(line.to_owned())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MetricsError::Timeout
                } else {
                    MetricsError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MetricsError::Status(status.as_u16()));
        }
        Ok(())
    }
}
