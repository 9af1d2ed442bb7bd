//! Observability module.
//!
//! Exports the sampled load as Prometheus metrics.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tokio_heavy::observability::Metrics;
//!
//! let metrics = Metrics::new()?;
//! metrics.observe(&sampler.load().snapshot());
//! println!("{}", metrics.export());
//! ```

pub mod metrics;

// Re-exports
pub use metrics::Metrics;
