//! tokio_heavy - load shedding for Tokio services.
//!
//! A [`Sampler`] periodically measures how loaded the process is and answers,
//! per request, whether new work should be accepted or rejected with a
//! "server under heavy load" error.
//!
//! # Signals
//!
//! - **Event loop delay**: how late the sampler's own timer fires
//! - **Event loop utilization**: fraction of time the runtime workers were busy
//! - **Heap used**: bytes allocated on the heap
//! - **RSS**: resident set size of the process
//!
//! Each signal has an optional limit; a limit of zero is ignored.
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_heavy::{Sampler, SamplerConfig};
//!
//! let sampler = Sampler::new(SamplerConfig::new(100).with_max_event_loop_delay_ms(50))?;
//! sampler.start()?;
//!
//! match sampler.check() {
//!     Ok(()) => { /* handle request */ }
//!     Err(e) if e.is_overloaded() => { /* respond 503 */ }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod error;
pub mod evaluator;
pub mod load;
pub mod logging;
pub mod observability;
pub mod sampler;
pub mod system;

// Re-exports for convenience
pub use config::{Config, ConfigError, SamplerConfig};
pub use error::{Error, Result};
pub use load::{Load, LoadSnapshot, Metric};
pub use sampler::{Sampler, SamplerState};
