//! Tokio runtime utilization probe.

use std::time::{Duration, Instant};

use tokio::runtime::Handle;

/// Source of runtime busy-fraction readings.
pub trait UtilizationProbe: Send {
    /// Whether the runtime exposes a busy-time signal at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Fraction (0.0 - 1.0) of time the runtime was busy since the previous
    /// call. `None` means no reading for this window.
    fn read_utilization(&mut self) -> Option<f64>;

    /// Start a new window now, discarding time since the previous reading.
    fn reset(&mut self) {}
}

/// Probe for runtimes without a busy-time signal. Always reads nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUtilization;

impl UtilizationProbe for NoUtilization {
    fn is_supported(&self) -> bool {
        false
    }

    fn read_utilization(&mut self) -> Option<f64> {
        None
    }
}

/// Busy fraction from Tokio's worker busy-duration counters.
///
/// Utilization over a window is the busy time added across all workers
/// divided by `wall time * workers`.
pub struct RuntimeUtilization {
    handle: Handle,
    last_busy: Duration,
    last_at: Instant,
}

impl RuntimeUtilization {
    /// Create a probe for the runtime behind `handle`, starting a new window now.
    pub fn new(handle: Handle) -> Self {
        let last_busy = total_busy(&handle);
        Self {
            handle,
            last_busy,
            last_at: Instant::now(),
        }
    }
}

impl UtilizationProbe for RuntimeUtilization {
    fn is_supported(&self) -> bool {
        self.handle.metrics().num_workers() > 0
    }

    fn read_utilization(&mut self) -> Option<f64> {
        let now = Instant::now();
        let busy = total_busy(&self.handle);
        let workers = self.handle.metrics().num_workers();

        let wall = now.saturating_duration_since(self.last_at);
        let busy_delta = busy.saturating_sub(self.last_busy);

        self.last_at = now;
        self.last_busy = busy;

        if workers == 0 || wall.is_zero() {
            return None;
        }

        let fraction = busy_delta.as_secs_f64() / (wall.as_secs_f64() * workers as f64);
        Some(fraction.clamp(0.0, 1.0))
    }

    fn reset(&mut self) {
        self.last_busy = total_busy(&self.handle);
        self.last_at = Instant::now();
    }
}

fn total_busy(handle: &Handle) -> Duration {
    let metrics = handle.metrics();
    (0..metrics.num_workers())
        .map(|worker| metrics.worker_total_busy_duration(worker))
        .sum()
}
