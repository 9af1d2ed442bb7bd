//! Prometheus metrics for tokio_heavy.
//!
//! Mirrors the live load record as gauges and counts rejections per metric.

use prometheus::{CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};
use tracing::warn;

use crate::load::{LoadSnapshot, Metric};

/// Prometheus registry with the load gauges.
pub struct Metrics {
    registry: Registry,

    /// Latest event loop delay in milliseconds
    pub event_loop_delay_ms: Gauge,

    /// Latest event loop utilization (0.0 - 1.0)
    pub event_loop_utilization: Gauge,

    /// Latest heap usage in bytes
    pub heap_used_bytes: Gauge,

    /// Latest resident set size in bytes
    pub rss_bytes: Gauge,

    /// Rejected checks by metric
    pub rejections_total: CounterVec,
}

impl Metrics {
    /// Create a new metrics registry with all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let event_loop_delay_ms = Gauge::new(
            "heavy_event_loop_delay_ms",
            "Milliseconds the load sampler timer fired late",
        )?;
        registry.register(Box::new(event_loop_delay_ms.clone()))?;

        let event_loop_utilization = Gauge::new(
            "heavy_event_loop_utilization",
            "Fraction of the last sample window the runtime was busy",
        )?;
        registry.register(Box::new(event_loop_utilization.clone()))?;

        let heap_used_bytes = Gauge::new("heavy_heap_used_bytes", "Heap bytes in use")?;
        registry.register(Box::new(heap_used_bytes.clone()))?;

        let rss_bytes = Gauge::new("heavy_rss_bytes", "Process resident set size in bytes")?;
        registry.register(Box::new(rss_bytes.clone()))?;

        let rejections_total = CounterVec::new(
            Opts::new("heavy_rejections_total", "Checks rejected due to load"),
            &["metric"],
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        Ok(Self {
            registry,
            event_loop_delay_ms,
            event_loop_utilization,
            heap_used_bytes,
            rss_bytes,
            rejections_total,
        })
    }

    /// Copy a load snapshot into the gauges.
    pub fn observe(&self, load: &LoadSnapshot) {
        self.event_loop_delay_ms.set(load.event_loop_delay_ms);
        self.event_loop_utilization
            .set(load.event_loop_utilization);
        self.heap_used_bytes.set(load.heap_used_bytes as f64);
        self.rss_bytes.set(load.rss_bytes as f64);
    }

    /// Count a rejection caused by `metric`.
    pub fn record_rejection(&self, metric: Metric) {
        self.rejections_total
            .with_label_values(&[metric.as_str()])
            .inc();
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            warn!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Get the Prometheus registry (for custom metrics).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
