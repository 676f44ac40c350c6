//! Shared state for the agent's HTTP surface and reporter wiring.

use std::sync::Arc;

use pizzametrics_core::error::Result;

use crate::aggregator::MetricsAggregator;
use crate::config::AgentConfig;
use crate::obs::ReporterStats;
use crate::reporter::{Reporter, ReporterHandle};
use crate::sampler::{HostSampler, SystemSampler};
use crate::transport::{HttpTransport, Transport};

#[derive(Clone)]
pub struct AgentState {
    inner: Arc<AgentStateInner>,
    aggregator: MetricsAggregator,
    stats: Arc<ReporterStats>,
}

struct AgentStateInner {
    cfg: AgentConfig,
    sampler: Arc<dyn SystemSampler>,
}

impl AgentState {
    /// Build state with the host sampler.
    pub fn new(cfg: AgentConfig) -> Self {
        Self::with_sampler(cfg, Arc::new(HostSampler::sysinfo()))
    }

    pub fn with_sampler(cfg: AgentConfig, sampler: Arc<dyn SystemSampler>) -> Self {
        Self {
            inner: Arc::new(AgentStateInner { cfg, sampler }),
            aggregator: MetricsAggregator::new(),
            stats: Arc::new(ReporterStats::new()),
        }
    }

    pub fn cfg(&self) -> &AgentConfig {
        &self.inner.cfg
    }

    /// Handle to inject into request handlers.
    pub fn aggregator(&self) -> MetricsAggregator {
        self.aggregator.clone()
    }

    pub fn stats(&self) -> Arc<ReporterStats> {
        Arc::clone(&self.stats)
    }

    pub fn sampler(&self) -> Arc<dyn SystemSampler> {
        Arc::clone(&self.inner.sampler)
    }

    /// Reporter pushing through `transport`, sharing this state's counters.
    pub fn reporter(&self, transport: Arc<dyn Transport>) -> Reporter {
        let m = &self.inner.cfg.metrics;
        Reporter::new(
            self.aggregator(),
            self.sampler(),
            transport,
            m.source.clone(),
            m.push_timeout(),
        )
        .with_stats(self.stats())
    }

    /// Spawn the reporter against the configured HTTP endpoint.
    pub fn start_reporter(&self) -> Result<ReporterHandle> {
        let m = &self.inner.cfg.metrics;
        let transport = HttpTransport::from_config(m)?;
        tracing::info!(url = %transport.url(), "metrics ingestion endpoint configured");
        Ok(self.reporter(Arc::new(transport)).spawn(m.period()))
    }
}
