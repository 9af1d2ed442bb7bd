//! Sampler error types.

use std::fmt;

use crate::config::ConfigError;
use crate::load::Metric;
use crate::sampler::SamplerState;

/// Errors returned by the sampler.
///
/// `Overloaded` is an expected outcome of [`check`](crate::Sampler::check)
/// and should be turned into backpressure. Every other variant points at a
/// wiring mistake in the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid sampler configuration.
    Config(ConfigError),

    /// `check()` called while the sampler is not running.
    NotRunning { state: SamplerState },

    /// `start()` called outside of a Tokio runtime.
    NoRuntime,

    /// A load limit is exceeded.
    Overloaded { metric: Metric },
}

impl Error {
    /// Check if this is an overload rejection.
    pub fn is_overloaded(&self) -> bool {
        matches!(self, Error::Overloaded { .. })
    }

    /// Check if this is a usage error (sampler misuse, not load).
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::NotRunning { .. } | Error::NoRuntime)
    }

    /// The exceeded metric, for overload rejections.
    pub fn metric(&self) -> Option<Metric> {
        match self {
            Error::Overloaded { metric } => Some(*metric),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "invalid load monitoring options: {}", e),
            Error::NotRunning { state } => {
                write!(f, "cannot check load when sampler is not started ({})", state)
            }
            Error::NoRuntime => write!(f, "sampler must be started inside a Tokio runtime"),
            Error::Overloaded { metric } => write!(f, "server under heavy load ({})", metric),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

/// Result type alias for sampler operations.
pub type Result<T> = std::result::Result<T, Error>;
