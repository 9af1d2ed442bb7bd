//! Threshold evaluation.
//!
//! Runs on every `check()`, so it is a handful of comparisons and nothing else.

use crate::config::SamplerConfig;
use crate::load::{LoadSnapshot, Metric};

/// Find the first configured limit exceeded by `load`.
///
/// Limits of zero are ignored. Comparisons are strict: a value equal to its
/// limit passes. When several limits are exceeded only the first one in
/// [`Metric::ALL`] order is reported.
#[inline]
pub fn evaluate(limits: &SamplerConfig, load: &LoadSnapshot) -> Option<Metric> {
    if limits.max_event_loop_delay_ms > 0
        && load.event_loop_delay_ms > limits.max_event_loop_delay_ms as f64
    {
        return Some(Metric::EventLoopDelay);
    }

    if limits.max_event_loop_utilization > 0.0
        && load.event_loop_utilization > limits.max_event_loop_utilization
    {
        return Some(Metric::EventLoopUtilization);
    }

    if limits.max_heap_used_bytes > 0 && load.heap_used_bytes > limits.max_heap_used_bytes {
        return Some(Metric::HeapUsed);
    }

    if limits.max_rss_bytes > 0 && load.rss_bytes > limits.max_rss_bytes {
        return Some(Metric::Rss);
    }

    None
}
