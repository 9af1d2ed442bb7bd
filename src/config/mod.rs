//! Configuration module for tokio_heavy.
//!
//! Settings are loaded from environment variables, merged onto documented
//! defaults and validated once before anything is started.
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_heavy::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Sample interval: {}ms", config.sampler.sample_interval_ms);
//! ```

mod error;
mod logging;
mod parse;
mod sampler;

use std::time::Duration;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::parse_duration;
pub use sampler::SamplerConfig;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Load sampler configuration.
    pub sampler: SamplerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// How often the daemon logs the current load (None = never).
    pub report_interval: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            sampler: SamplerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
            report_interval: parse::env_duration("HEAVY_REPORT_INTERVAL", "5s")?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");

        if !self.sampler.is_sampling_enabled() {
            info!("  Load sampling: disabled");
        } else {
            info!("  Sample interval: {}ms", self.sampler.sample_interval_ms);
        }

        if self.sampler.max_event_loop_delay_ms > 0 {
            info!(
                "  Max event loop delay: {}ms",
                self.sampler.max_event_loop_delay_ms
            );
        }

        if self.sampler.max_event_loop_utilization > 0.0 {
            info!(
                "  Max event loop utilization: {:.1}%",
                self.sampler.max_event_loop_utilization * 100.0
            );
        }

        if self.sampler.max_heap_used_bytes > 0 {
            info!("  Max heap used: {} bytes", self.sampler.max_heap_used_bytes);
        }

        if self.sampler.max_rss_bytes > 0 {
            info!("  Max RSS: {} bytes", self.sampler.max_rss_bytes);
        }

        match self.report_interval {
            Some(interval) => info!("  Report interval: {:?}", interval),
            None => info!("  Load reports: disabled"),
        }
    }
}
