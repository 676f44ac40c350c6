//! Periodic flush of aggregated counters to the ingestion endpoint.
//!
//! Each tick:
//! 1. takes the current window (copy + reset of windowed counters),
//! 2. samples host CPU/memory,
//! 3. encodes the fixed measurement set and pushes every line concurrently,
//!    each push bounded by `push_timeout`.
//!
//! A failed encode or push is logged and counted, never propagated, and never
//! stops the remaining pushes or future ticks. Flushes run on their own task
//! so a slow endpoint cannot delay the timer.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use pizzametrics_core::error::MetricsError;

use crate::aggregator::MetricsAggregator;
use crate::obs::ReporterStats;
use crate::sampler::SystemSampler;
use crate::transport::Transport;

/// Outcome of one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub struct Reporter {
    aggregator: MetricsAggregator,
    sampler: Arc<dyn SystemSampler>,
    transport: Arc<dyn Transport>,
    stats: Arc<ReporterStats>,
    source: String,
    push_timeout: Duration,
}

impl Reporter {
    pub fn new(
        aggregator: MetricsAggregator,
        sampler: Arc<dyn SystemSampler>,
        transport: Arc<dyn Transport>,
        source: impl Into<String>,
        push_timeout: Duration,
    ) -> Self {
        Self {
            aggregator,
            sampler,
            transport,
            stats: Arc::new(ReporterStats::new()),
            source: source.into(),
            push_timeout,
        }
    }

    /// Share an externally owned stats registry (e.g. the one `/metrics` renders).
    pub fn with_stats(mut self, stats: Arc<ReporterStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> Arc<ReporterStats> {
        Arc::clone(&self.stats)
    }

    /// Run one reporting cycle and wait for every push to settle.
    pub async fn flush(&self) -> FlushReport {
        self.stats.record_tick();

        let window = self.aggregator.take_window();
        let usage = self.sampler.sample();
        let measurements = window.measurements(&self.source, &usage);

        let mut report = FlushReport {
            attempted: measurements.len(),
            ..FlushReport::default()
        };

        // Futures are first polled in insertion order, so pushes are issued
        // in catalogue order; completion order is unspecified.
        let mut futs = FuturesUnordered::new();
        for m in measurements {
            let name = m.name().to_string();
            let line = match m.encode() {
                Ok(line) => line,
                Err(e) => {
                    warn!(measurement = %name, error = %e, kind = e.kind().as_str(), "metric encode failed");
                    self.stats.record_push(&name, e.kind().as_str());
                    report.failed += 1;
                    continue;
                }
            };

            let transport = Arc::clone(&self.transport);
            let push_timeout = self.push_timeout;
            futs.push(async move {
                let res = match timeout(push_timeout, transport.push(&line)).await {
                    Ok(res) => res,
                    Err(_) => Err(MetricsError::Timeout),
                };
                (name, line, res)
            });
        }

        while let Some((name, line, res)) = futs.next().await {
            match res {
                Ok(()) => {
                    debug!(measurement = %name, %line, "pushed metric");
                    self.stats.record_push(&name, "ok");
                    report.delivered += 1;
                }
                Err(e) => {
                    warn!(measurement = %name, error = %e, kind = e.kind().as_str(), "failed to push metric");
                    self.stats.record_push(&name, e.kind().as_str());
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Start the periodic loop. The first flush happens one `period` from now.
    pub fn spawn(self, period: Duration) -> ReporterHandle {
        // tokio intervals reject a zero period.
        let period = period.max(Duration::from_millis(1));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let reporter = Arc::new(self);

        let task = tokio::spawn(async move {
            info!(
                period_ms = period.as_millis() as u64,
                source = %reporter.source,
                "metrics reporter started"
            );

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let r = Arc::clone(&reporter);
                        tokio::spawn(async move {
                            let report = r.flush().await;
                            debug!(
                                attempted = report.attempted,
                                delivered = report.delivered,
                                failed = report.failed,
                                "metrics flush finished"
                            );
                        });
                    }
                    // Also fires when the handle is dropped (sender closed).
                    _ = shutdown_rx.changed() => {
                        info!("metrics reporter shutting down");
                        break;
                    }
                }
            }
        });

        ReporterHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Control handle for a spawned reporter loop.
///
/// Dropping the handle also stops the loop. The loop never holds the runtime
/// open on its own: once the host's `main` returns, the runtime drops it along
/// with any in-flight pushes.
pub struct ReporterHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReporterHandle {
    /// Stop the loop and wait for it to exit. In-flight pushes are not cancelled.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "metrics reporter task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
