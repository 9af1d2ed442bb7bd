//! Load shedding scenarios

use std::time::Duration;

use crate::helpers::*;
use tokio_heavy::{Metric, SamplerConfig};
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_event_loop_delay_rejects_blocked_runtime() {
    let sampler = sampler(SamplerConfig::new(1).with_max_event_loop_delay_ms(5));
    assert_ok!(sampler.start());
    assert_ok!(sampler.check());

    busy_wait(Duration::from_millis(10));

    let err = assert_err!(sampler.check());
    assert!(err.is_overloaded());
    assert_eq!(err.metric(), Some(Metric::EventLoopDelay));
    assert_eq!(err.to_string(), "server under heavy load (event loop)");
    assert!(sampler.load().event_loop_delay_ms() > 0.0);

    sampler.stop();
}

#[tokio::test]
async fn test_block_before_first_tick_is_measured() {
    let sampler = sampler(SamplerConfig::new(20));
    assert_ok!(sampler.start());

    // The sampler task has not run yet
    busy_wait(Duration::from_millis(50));
    sleep_ms(5).await;

    assert!(sampler.load().event_loop_delay_ms() >= 20.0);

    sampler.stop();
}

#[tokio::test]
async fn test_delay_never_negative() {
    let sampler = sampler(SamplerConfig::new(2));
    assert_ok!(sampler.start());

    for _ in 0..5 {
        sleep_ms(3).await;
        assert!(sampler.load().event_loop_delay_ms() >= 0.0);
    }

    sampler.stop();
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_rss_limit_rejects() {
    let sampler = sampler(SamplerConfig::new(5).with_max_rss_bytes(1));
    assert_ok!(sampler.start());

    sleep_ms(10).await;

    let err = assert_err!(sampler.check());
    assert_eq!(err.metric(), Some(Metric::Rss));
    assert_eq!(err.to_string(), "server under heavy load (rss)");
    assert!(sampler.load().rss_bytes() > 10_000);

    sampler.stop();
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_generous_limits_accept() {
    let config = SamplerConfig::new(5)
        .with_max_event_loop_delay_ms(10_000)
        .with_max_rss_bytes(u64::MAX / 2)
        .with_max_heap_used_bytes(u64::MAX / 2);
    let sampler = sampler(config);
    assert_ok!(sampler.start());

    sleep_ms(15).await;

    assert_ok!(sampler.check());
    assert!(sampler.load().heap_used_bytes() > 0);

    sampler.stop();
}
