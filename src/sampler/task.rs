//! Sampling loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use crate::load::Load;
use crate::system::{MemoryProbe, UtilizationProbe};

/// Utilization probe shared between the sampler and its task.
pub(crate) type SharedUtilization = Arc<Mutex<Box<dyn UtilizationProbe>>>;

/// Instant the current tick was armed, readable without locking.
///
/// Stored as nanoseconds since `origin` so it fits in an atomic.
#[derive(Debug)]
pub(crate) struct Baseline {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl Baseline {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Move the baseline to now.
    pub(crate) fn reset(&self) {
        let nanos = self.origin.elapsed().as_nanos() as u64;
        self.offset_nanos.store(nanos, Ordering::Release);
    }

    /// Instant of the last reset.
    pub(crate) fn armed_at(&self) -> Instant {
        self.origin + Duration::from_nanos(self.offset_nanos.load(Ordering::Acquire))
    }

    /// Time since the last reset.
    pub(crate) fn elapsed(&self) -> Duration {
        let offset = Duration::from_nanos(self.offset_nanos.load(Ordering::Acquire));
        self.origin.elapsed().saturating_sub(offset)
    }
}

/// Milliseconds by which `elapsed` exceeds `interval` (negative when early).
pub(crate) fn overrun_ms(elapsed: Duration, interval: Duration) -> f64 {
    let overrun_nanos = elapsed.as_nanos() as i128 - interval.as_nanos() as i128;
    overrun_nanos as f64 / 1_000_000.0
}

/// Everything one sampling loop needs, moved into its task.
pub(crate) struct SamplerTask {
    pub(crate) interval: Duration,
    pub(crate) load: Arc<Load>,
    pub(crate) baseline: Arc<Baseline>,
    pub(crate) memory: Arc<dyn MemoryProbe>,
    pub(crate) utilization: SharedUtilization,
}

impl SamplerTask {
    /// Sleep, measure, re-arm, repeat. Runs until the task is aborted.
    ///
    /// The first deadline counts from the baseline set by `start()`, so time
    /// spent before the task is first polled shows up as delay. Each later
    /// iteration sleeps a full interval from its own baseline instead of
    /// using a fixed-rate timer, so a late wake-up never queues extra ticks.
    pub(crate) async fn run(self) {
        loop {
            tokio::time::sleep_until(self.baseline.armed_at() + self.interval).await;
            self.measure();
            self.baseline.reset();
        }
    }

    /// Record one sample into the load record. Never fails.
    fn measure(&self) {
        let delay_ms = overrun_ms(self.baseline.elapsed(), self.interval);
        self.load.set_event_loop_delay_ms(delay_ms);

        // A poisoned probe counts as no reading
        let utilization = self
            .utilization
            .lock()
            .ok()
            .and_then(|mut probe| probe.read_utilization())
            .unwrap_or(0.0);
        self.load.set_event_loop_utilization(utilization);

        match self.memory.read_memory() {
            Ok(stats) => self.load.set_memory(stats.heap_used_bytes, stats.rss_bytes),
            Err(e) => {
                debug!(error = %e, "memory read failed, recording zero");
                self.load.set_memory(0, 0);
            }
        }

        trace!(
            delay_ms = self.load.event_loop_delay_ms(),
            utilization = self.load.event_loop_utilization(),
            heap_used_bytes = self.load.heap_used_bytes(),
            rss_bytes = self.load.rss_bytes(),
            "load sampled"
        );
    }
}
