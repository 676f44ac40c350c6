//! Labelled counters backed by `DashMap`.
//!
//! Labels are flattened into sorted key vectors to keep deterministic
//! ordering; rendering sorts series so output is stable between scrapes.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value of one series (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        out.push_str(&format!("# TYPE {name} counter\n"));
        let mut series: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| {
                let label_str = r
                    .key()
                    .iter()
                    .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
                    .collect::<Vec<_>>()
                    .join(",");
                (label_str, r.value().load(Ordering::Relaxed))
            })
            .collect();
        series.sort();
        for (label_str, val) in series {
            out.push_str(&format!("{name}{{{label_str}}} {val}\n"));
        }
    }
}

/// Counters describing what the reporter did.
#[derive(Default)]
pub struct ReporterStats {
    /// Labels: `measurement`, `outcome` (`ok` or an error kind).
    pub pushes: CounterVec,
    ticks: AtomicU64,
}

impl ReporterStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn record_push(&self, measurement: &str, outcome: &str) {
        self.pushes
            .inc(&[("measurement", measurement), ("outcome", outcome)]);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# TYPE pizzametrics_reporter_ticks_total counter\n");
        out.push_str(&format!("pizzametrics_reporter_ticks_total {}\n", self.ticks()));
        self.pushes.render("pizzametrics_pushes_total", &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_order_does_not_matter() {
        let c = CounterVec::default();
        c.inc(&[("a", "1"), ("b", "2")]);
        c.inc(&[("b", "2"), ("a", "1")]);
        assert_eq!(c.get(&[("a", "1"), ("b", "2")]), 2);
        assert_eq!(c.get(&[("a", "9")]), 0);
    }

    #[test]
    fn render_is_sorted_prometheus_text() {
        let stats = ReporterStats::new();
        stats.record_tick();
        stats.record_push("revenue", "ok");
        stats.record_push("cpu_usage", "TIMEOUT");
        stats.record_push("cpu_usage", "TIMEOUT");

        let out = stats.render();
        assert!(out.contains("pizzametrics_reporter_ticks_total 1"));
        let cpu = out
            .find("pizzametrics_pushes_total{measurement=\"cpu_usage\",outcome=\"TIMEOUT\"} 2")
            .unwrap();
        let rev = out
            .find("pizzametrics_pushes_total{measurement=\"revenue\",outcome=\"ok\"} 1")
            .unwrap();
        assert!(cpu < rev);
    }

    #[test]
    fn render_emits_exact_exposition_text() {
        let stats = ReporterStats::new();
        stats.record_tick();
        stats.record_tick();
        stats.record_push("pizza_latency", "ok");

        assert_eq!(
            stats.render(),
            "# TYPE pizzametrics_reporter_ticks_total counter\n\
             pizzametrics_reporter_ticks_total 2\n\
             # TYPE pizzametrics_pushes_total counter\n\
             pizzametrics_pushes_total{measurement=\"pizza_latency\",outcome=\"ok\"} 1\n"
        );
    }
}
