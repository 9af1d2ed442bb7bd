//! Load sampler configuration.

use std::time::Duration;

use super::parse::env_parse;
use super::ConfigError;

/// Load sampler settings.
///
/// Every field defaults to zero: no sampling and no limits. A limit of zero
/// means "no limit". Limits only make sense while sampling is enabled, which
/// [`SamplerConfig::validate`] enforces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SamplerConfig {
    /// Frequency of load sampling in milliseconds (0 = no sampling).
    pub sample_interval_ms: u64,
    /// Event loop delay in milliseconds after which work is rejected.
    pub max_event_loop_delay_ms: u64,
    /// Fraction (0.0 - 1.0) of runtime busy time after which work is rejected.
    pub max_event_loop_utilization: f64,
    /// Heap usage in bytes after which work is rejected.
    pub max_heap_used_bytes: u64,
    /// Resident set size in bytes after which work is rejected.
    pub max_rss_bytes: u64,
}

impl SamplerConfig {
    /// Create a config that samples every `interval_ms` milliseconds.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            sample_interval_ms: interval_ms,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// The result is validated before it is returned.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            sample_interval_ms: env_parse("HEAVY_SAMPLE_INTERVAL_MS", 0)?,
            max_event_loop_delay_ms: env_parse("HEAVY_MAX_EVENT_LOOP_DELAY_MS", 0)?,
            max_event_loop_utilization: env_parse("HEAVY_MAX_EVENT_LOOP_UTILIZATION", 0.0)?,
            max_heap_used_bytes: env_parse("HEAVY_MAX_HEAP_USED_BYTES", 0)?,
            max_rss_bytes: env_parse("HEAVY_MAX_RSS_BYTES", 0)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the event loop delay limit in milliseconds.
    pub fn with_max_event_loop_delay_ms(mut self, ms: u64) -> Self {
        self.max_event_loop_delay_ms = ms;
        self
    }

    /// Set the event loop utilization limit (0.0 - 1.0).
    pub fn with_max_event_loop_utilization(mut self, fraction: f64) -> Self {
        self.max_event_loop_utilization = fraction;
        self
    }

    /// Set the heap usage limit in bytes.
    pub fn with_max_heap_used_bytes(mut self, bytes: u64) -> Self {
        self.max_heap_used_bytes = bytes;
        self
    }

    /// Set the resident set size limit in bytes.
    pub fn with_max_rss_bytes(mut self, bytes: u64) -> Self {
        self.max_rss_bytes = bytes;
        self
    }

    /// Check whether sampling is enabled.
    pub fn is_sampling_enabled(&self) -> bool {
        self.sample_interval_ms > 0
    }

    /// Sample interval as a Duration (zero when disabled).
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Check whether any load limit is configured.
    pub fn has_limits(&self) -> bool {
        self.max_event_loop_delay_ms > 0
            || self.max_event_loop_utilization > 0.0
            || self.max_heap_used_bytes > 0
            || self.max_rss_bytes > 0
    }

    /// Validate the settings.
    ///
    /// Fails when a limit is set without a sample interval, or when the
    /// utilization limit is not a fraction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let utilization = self.max_event_loop_utilization;
        if !utilization.is_finite() || !(0.0..=1.0).contains(&utilization) {
            return Err(ConfigError::Invalid {
                key: "max_event_loop_utilization".into(),
                message: format!("{} is not within 0.0 - 1.0", utilization),
            });
        }

        if self.is_sampling_enabled() {
            return Ok(());
        }

        let limits = [
            ("max_event_loop_delay_ms", self.max_event_loop_delay_ms > 0),
            ("max_event_loop_utilization", utilization > 0.0),
            ("max_heap_used_bytes", self.max_heap_used_bytes > 0),
            ("max_rss_bytes", self.max_rss_bytes > 0),
        ];

        match limits.iter().find(|(_, set)| *set) {
            Some((key, _)) => Err(ConfigError::SamplingDisabled {
                key: (*key).to_string(),
            }),
            None => Ok(()),
        }
    }
}
