//! Process memory probe.
//!
//! Reads resident and data-segment sizes from `/proc/self/statm`. When the
//! crate's [`TrackingAllocator`] is installed as the global allocator, heap
//! usage comes from its counter instead of the data segment.

use std::fs;
use std::io;
use std::path::PathBuf;

use super::alloc::TrackingAllocator;

/// Point-in-time process memory figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Heap bytes in use.
    pub heap_used_bytes: u64,
    /// Resident set size in bytes.
    pub rss_bytes: u64,
}

/// Source of process memory figures.
pub trait MemoryProbe: Send + Sync {
    /// Read the current heap and resident memory.
    fn read_memory(&self) -> io::Result<MemoryStats>;
}

/// Where heap usage is read from.
#[derive(Clone, Copy)]
enum HeapSource {
    /// Data + stack pages from statm.
    DataSegment,
    /// Live bytes counted by the global allocator.
    Tracking(&'static TrackingAllocator),
}

/// Memory probe for the current process.
#[derive(Clone)]
pub struct ProcessMemory {
    statm_path: PathBuf,
    page_size: u64,
    heap: HeapSource,
}

impl ProcessMemory {
    /// Create a probe reading `/proc/self/statm`.
    pub fn new() -> Self {
        Self {
            statm_path: PathBuf::from("/proc/self/statm"),
            page_size: page_size(),
            heap: HeapSource::DataSegment,
        }
    }

    /// Read statm from another path (for testing).
    pub fn with_statm_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.statm_path = path.into();
        self
    }

    /// Report heap usage from the installed tracking allocator.
    ///
    /// ```rust,ignore
    /// #[global_allocator]
    /// static ALLOC: TrackingAllocator = TrackingAllocator::new();
    ///
    /// let probe = ProcessMemory::new().with_tracking_allocator(&ALLOC);
    /// ```
    pub fn with_tracking_allocator(mut self, allocator: &'static TrackingAllocator) -> Self {
        self.heap = HeapSource::Tracking(allocator);
        self
    }
}

impl Default for ProcessMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for ProcessMemory {
    fn read_memory(&self) -> io::Result<MemoryStats> {
        let content = fs::read_to_string(&self.statm_path)?;
        let statm = parse_statm(&content)?;

        let heap_used_bytes = match self.heap {
            HeapSource::DataSegment => statm.data_pages * self.page_size,
            HeapSource::Tracking(allocator) => allocator.allocated_bytes(),
        };

        Ok(MemoryStats {
            heap_used_bytes,
            rss_bytes: statm.resident_pages * self.page_size,
        })
    }
}

/// Fields of `/proc/<pid>/statm` used by the probe, in pages.
#[derive(Debug, PartialEq, Eq)]
struct Statm {
    resident_pages: u64,
    data_pages: u64,
}

/// Parse statm: `size resident shared text lib data dt`.
fn parse_statm(content: &str) -> io::Result<Statm> {
    let fields: Vec<u64> = content
        .split_whitespace()
        .map(|s| s.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if fields.len() < 6 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("expected at least 6 statm fields, got {}", fields.len()),
        ));
    }

    Ok(Statm {
        resident_pages: fields[1],
        data_pages: fields[5],
    })
}

#[cfg(unix)]
fn page_size() -> u64 {
    // SAFETY: sysconf has no preconditions
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        4096
    }
}

#[cfg(not(unix))]
fn page_size() -> u64 {
    4096
}
