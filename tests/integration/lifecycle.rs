//! Start/stop lifecycle tests

use crate::helpers::*;
use tokio_heavy::{ConfigError, Error, LoadSnapshot, Sampler, SamplerConfig, SamplerState};
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_construction_requires_interval_for_limits() {
    let with_limit = [
        SamplerConfig::default().with_max_event_loop_delay_ms(5),
        SamplerConfig::default().with_max_event_loop_utilization(0.5),
        SamplerConfig::default().with_max_heap_used_bytes(1),
        SamplerConfig::default().with_max_rss_bytes(1),
    ];
    for config in with_limit {
        let err = Sampler::new(config).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::SamplingDisabled { .. })
        ));
    }

    assert_ok!(Sampler::new(SamplerConfig::default()));
    assert_ok!(Sampler::new(SamplerConfig::new(5).with_max_rss_bytes(1)));
}

#[tokio::test]
async fn test_disabled_sampler_always_accepts() {
    let sampler = sampler(SamplerConfig::default());
    assert_ok!(sampler.start());

    for _ in 0..10 {
        assert_ok!(sampler.check());
    }
    sleep_ms(20).await;

    assert_ok!(sampler.check());
    assert_eq!(sampler.load().snapshot(), LoadSnapshot::default());
    sampler.stop();
}

#[tokio::test]
async fn test_check_before_start() {
    let sampler = sampler(SamplerConfig::new(5).with_max_rss_bytes(1));

    let err = assert_err!(sampler.check());
    assert!(err.is_usage());
    assert!(!err.is_overloaded());
    assert_eq!(
        err,
        Error::NotRunning {
            state: SamplerState::NotStarted
        }
    );
}

#[tokio::test]
async fn test_stop_freezes_load() {
    let sampler = sampler(SamplerConfig::new(5));
    assert_ok!(sampler.start());
    sleep_ms(20).await;

    sampler.stop();
    let before = sampler.load().snapshot();

    // Twice the interval, and then some
    sleep_ms(15).await;

    assert_eq!(sampler.load().snapshot(), before);
    assert_eq!(sampler.state(), SamplerState::Stopped);
}

#[tokio::test]
async fn test_double_start_single_stop() {
    let sampler = sampler(SamplerConfig::new(5));
    assert_ok!(sampler.start());
    assert_ok!(sampler.start());
    assert!(sampler.is_running());
    sleep_ms(15).await;

    sampler.stop();
    let before = sampler.load().snapshot();
    sleep_ms(15).await;

    assert_eq!(sampler.load().snapshot(), before);
    assert!(!sampler.is_running());
}

#[test]
fn test_start_without_runtime_fails() {
    let sampler = sampler(SamplerConfig::new(5));
    let err = assert_err!(sampler.start());
    assert_eq!(err, Error::NoRuntime);
    assert!(err.is_usage());
}
