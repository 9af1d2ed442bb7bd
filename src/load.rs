//! Shared load record.
//!
//! A single [`Load`] instance is created per sampler and updated in place, so
//! every holder of the `Arc<Load>` always reads the latest values. Fields are
//! atomics: the sampler task writes them, `check()` may raise the delay, and
//! any number of readers load them without locking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// A measured load signal that can trigger rejection.
///
/// Variants are declared in reporting priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Lateness of the sampler's timer on the runtime.
    EventLoopDelay,
    /// Fraction of wall time the runtime workers were busy.
    EventLoopUtilization,
    /// Heap bytes in use.
    HeapUsed,
    /// Resident set size.
    Rss,
}

impl Metric {
    /// All metrics, in reporting priority order.
    pub const ALL: [Metric; 4] = [
        Metric::EventLoopDelay,
        Metric::EventLoopUtilization,
        Metric::HeapUsed,
        Metric::Rss,
    ];

    /// Short label, suitable for metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::EventLoopDelay => "event_loop_delay",
            Metric::EventLoopUtilization => "event_loop_utilization",
            Metric::HeapUsed => "heap_used",
            Metric::Rss => "rss",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::EventLoopDelay => write!(f, "event loop"),
            Metric::EventLoopUtilization => write!(f, "event loop utilization"),
            Metric::HeapUsed => write!(f, "heap"),
            Metric::Rss => write!(f, "rss"),
        }
    }
}

/// Point-in-time copy of the load record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoadSnapshot {
    /// Milliseconds the sampler's timer fired late (never negative).
    pub event_loop_delay_ms: f64,
    /// Fraction (0.0 - 1.0) of the last window the runtime was busy.
    pub event_loop_utilization: f64,
    /// Heap bytes in use.
    pub heap_used_bytes: u64,
    /// Resident set size in bytes.
    pub rss_bytes: u64,
}

/// Current process load, continuously updated by the sampler.
///
/// Floating point values are stored as their bit patterns.
#[derive(Debug, Default)]
pub struct Load {
    event_loop_delay_ms: AtomicU64,
    event_loop_utilization: AtomicU64,
    heap_used_bytes: AtomicU64,
    rss_bytes: AtomicU64,
}

impl Load {
    /// Create a zeroed load record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest event loop delay in milliseconds.
    pub fn event_loop_delay_ms(&self) -> f64 {
        f64::from_bits(self.event_loop_delay_ms.load(Ordering::Acquire))
    }

    /// Latest event loop utilization (0.0 - 1.0).
    pub fn event_loop_utilization(&self) -> f64 {
        f64::from_bits(self.event_loop_utilization.load(Ordering::Acquire))
    }

    /// Latest heap usage in bytes.
    pub fn heap_used_bytes(&self) -> u64 {
        self.heap_used_bytes.load(Ordering::Acquire)
    }

    /// Latest resident set size in bytes.
    pub fn rss_bytes(&self) -> u64 {
        self.rss_bytes.load(Ordering::Acquire)
    }

    /// Copy all fields.
    pub fn snapshot(&self) -> LoadSnapshot {
        LoadSnapshot {
            event_loop_delay_ms: self.event_loop_delay_ms(),
            event_loop_utilization: self.event_loop_utilization(),
            heap_used_bytes: self.heap_used_bytes(),
            rss_bytes: self.rss_bytes(),
        }
    }

    /// Overwrite the delay. Negative and non-finite values are stored as 0.
    pub(crate) fn set_event_loop_delay_ms(&self, ms: f64) {
        self.event_loop_delay_ms
            .store(non_negative(ms).to_bits(), Ordering::Release);
    }

    /// Raise the delay to `ms` if it is larger than the stored value.
    pub(crate) fn raise_event_loop_delay_ms(&self, ms: f64) {
        let ms = non_negative(ms);
        let _ = self.event_loop_delay_ms.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |bits| (ms > f64::from_bits(bits)).then(|| ms.to_bits()),
        );
    }

    pub(crate) fn set_event_loop_utilization(&self, fraction: f64) {
        let fraction = non_negative(fraction).min(1.0);
        self.event_loop_utilization
            .store(fraction.to_bits(), Ordering::Release);
    }

    pub(crate) fn set_memory(&self, heap_used_bytes: u64, rss_bytes: u64) {
        self.heap_used_bytes
            .store(heap_used_bytes, Ordering::Release);
        self.rss_bytes.store(rss_bytes, Ordering::Release);
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
