//! Test helpers and utilities

use std::time::{Duration, Instant};

use tokio_heavy::{Sampler, SamplerConfig};

/// Build a sampler, panicking on invalid configuration.
pub fn sampler(config: SamplerConfig) -> Sampler {
    Sampler::new(config).expect("valid sampler config")
}

/// Keep the current thread busy without yielding to the runtime.
pub fn busy_wait(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}

/// Yield to the runtime for `ms` milliseconds.
pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
