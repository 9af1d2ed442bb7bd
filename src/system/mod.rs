//! Host probes used by the sampler.
//!
//! - **Memory**: heap and resident set size of the current process
//! - **Runtime**: busy fraction of the Tokio runtime workers
//!
//! Both sit behind traits so tests and embedders can plug in their own sources.
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_heavy::system::{MemoryProbe, ProcessMemory};
//!
//! let stats = ProcessMemory::new().read_memory()?;
//! println!("rss: {} bytes, heap: {} bytes", stats.rss_bytes, stats.heap_used_bytes);
//! ```

mod alloc;
mod memory;
mod runtime;

pub use alloc::TrackingAllocator;
pub use memory::{MemoryProbe, MemoryStats, ProcessMemory};
pub use runtime::{NoUtilization, RuntimeUtilization, UtilizationProbe};
