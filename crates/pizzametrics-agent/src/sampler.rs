//! Host resource sampling (CPU load and memory pressure).
//!
//! `SystemSampler` is what the reporter consumes; `HostSampler` turns raw
//! figures from a `HostProbe` into percentages. Figures are read fresh on
//! every call so changing limits (e.g. container memory) are picked up.
//! Missing figures degrade to a `0.0` sentinel instead of failing the tick.

use std::sync::Mutex;

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

/// Percentages sampled once per reporter tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

pub trait SystemSampler: Send + Sync {
    /// 1-minute load average per logical CPU, as a percentage. Not clamped.
    fn cpu_usage_percent(&self) -> f64;
    /// Used share of total memory, as a percentage.
    fn memory_usage_percent(&self) -> f64;

    fn sample(&self) -> ResourceUsage {
        ResourceUsage {
            cpu_percent: self.cpu_usage_percent(),
            memory_percent: self.memory_usage_percent(),
        }
    }
}

/// Raw host figures.
pub trait HostProbe: Send + Sync {
    fn load_average_one(&self) -> Option<f64>;
    fn logical_cpus(&self) -> Option<usize>;
    /// `(total, free)` in bytes.
    fn memory(&self) -> Option<(u64, u64)>;
}

pub struct HostSampler<P> {
    probe: P,
}

impl<P: HostProbe> HostSampler<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }
}

impl HostSampler<SysinfoProbe> {
    pub fn sysinfo() -> Self {
        Self::new(SysinfoProbe::new())
    }
}

impl<P: HostProbe> SystemSampler for HostSampler<P> {
    fn cpu_usage_percent(&self) -> f64 {
        match (self.probe.load_average_one(), self.probe.logical_cpus()) {
            (Some(load), Some(cpus)) => cpu_percent(load, cpus),
            _ => {
                tracing::debug!("cpu figures unavailable; reporting 0");
                0.0
            }
        }
    }

    fn memory_usage_percent(&self) -> f64 {
        match self.probe.memory() {
            Some((total, free)) => memory_percent(total, free),
            None => {
                tracing::debug!("memory figures unavailable; reporting 0");
                0.0
            }
        }
    }
}

/// Load per logical CPU as a percentage, two decimals.
pub fn cpu_percent(load_one: f64, logical_cpus: usize) -> f64 {
    if logical_cpus == 0 || !load_one.is_finite() || load_one < 0.0 {
        return 0.0;
    }
    round2(load_one / logical_cpus as f64 * 100.0)
}

/// `(total - free) / total * 100`, two decimals.
pub fn memory_percent(total: u64, free: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(free);
    round2(used as f64 / total as f64 * 100.0)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `HostProbe` backed by the `sysinfo` crate.
pub struct SysinfoProbe {
    system: Mutex<System>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing())
                .with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        Self {
            system: Mutex::new(system),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HostProbe for SysinfoProbe {
    fn load_average_one(&self) -> Option<f64> {
        Some(System::load_average().one)
    }

    fn logical_cpus(&self) -> Option<usize> {
        let system = self.system.lock().ok()?;
        match system.cpus().len() {
            0 => None,
            n => Some(n),
        }
    }

    fn memory(&self) -> Option<(u64, u64)> {
        let mut system = self.system.lock().ok()?;
        system.refresh_memory();
        Some((system.total_memory(), system.available_memory()))
    }
}
