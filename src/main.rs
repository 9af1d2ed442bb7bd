use std::time::Duration;

use tracing::{debug, info, warn};

use tokio_heavy::config::Config;
use tokio_heavy::observability::Metrics;
use tokio_heavy::{logging, Sampler};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;

    logging::init(&config.logging)?;

    info!("Starting tokio_heavy {}", tokio_heavy::VERSION);
    config.log_summary();

    // Single-threaded runtime: delay is measured on the loop that serves work
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let sampler = Sampler::new(config.sampler.clone())?;
    let metrics = Metrics::new()?;

    sampler.start()?;

    match config.report_interval {
        Some(interval) => {
            tokio::select! {
                _ = report_loop(&sampler, &metrics, interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down...");
                }
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            info!("Shutting down...");
        }
    }

    sampler.stop();
    metrics.observe(&sampler.load().snapshot());
    debug!(metrics = %metrics.export(), "final metrics");

    Ok(())
}

/// Log the load and the check outcome every `interval`.
async fn report_loop(sampler: &Sampler, metrics: &Metrics, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let outcome = sampler.check();
        let load = sampler.load().snapshot();
        metrics.observe(&load);

        match outcome {
            Ok(()) => info!(
                delay_ms = load.event_loop_delay_ms,
                utilization = load.event_loop_utilization,
                heap_used_bytes = load.heap_used_bytes,
                rss_bytes = load.rss_bytes,
                "load ok"
            ),
            Err(e) => {
                if let Some(metric) = e.metric() {
                    metrics.record_rejection(metric);
                }
                warn!(
                    error = %e,
                    delay_ms = load.event_loop_delay_ms,
                    utilization = load.event_loop_utilization,
                    heap_used_bytes = load.heap_used_bytes,
                    rss_bytes = load.rss_bytes,
                    "load check failed"
                );
            }
        }
    }
}
