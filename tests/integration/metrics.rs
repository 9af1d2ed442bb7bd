//! Prometheus export of sampled load

use crate::helpers::*;
use tokio_heavy::observability::Metrics;
use tokio_heavy::SamplerConfig;
use tokio_test::{assert_err, assert_ok};

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_rejections_are_exported() {
    let sampler = sampler(SamplerConfig::new(5).with_max_rss_bytes(1));
    let metrics = assert_ok!(Metrics::new());
    assert_ok!(sampler.start());

    sleep_ms(10).await;

    let err = assert_err!(sampler.check());
    if let Some(metric) = err.metric() {
        metrics.record_rejection(metric);
    }
    metrics.observe(&sampler.load().snapshot());

    let output = metrics.export();
    assert!(output.contains("heavy_rejections_total{metric=\"rss\"} 1"));
    assert!(!output.contains("heavy_rss_bytes 0\n"));

    sampler.stop();
}

#[test]
fn test_export_before_sampling() {
    let metrics = assert_ok!(Metrics::new());
    metrics.observe(&sampler(SamplerConfig::new(5)).load().snapshot());

    let output = metrics.export();
    assert!(output.contains("heavy_event_loop_delay_ms 0"));
    assert!(output.contains("# TYPE heavy_rss_bytes gauge"));
}
