//! Load sampler.
//!
//! Measures how overloaded the process is and answers, on every request,
//! whether new work should be accepted.
//!
//! The delay signal comes from the runtime itself: a task asks to sleep for
//! the sample interval and records how late it actually woke up. Anything
//! hogging the runtime delays that wake-up exactly as it delays request
//! handling. Between ticks, [`Sampler::check`] also looks at how overdue the
//! pending tick is, so a runtime that is blocked right now is caught before the
//! sampler task gets a chance to run.
//!
//! # Example
//!
//! ```rust,ignore
//! use tokio_heavy::{Sampler, SamplerConfig};
//!
//! let config = SamplerConfig::new(100)
//!     .with_max_event_loop_delay_ms(50)
//!     .with_max_rss_bytes(2 * 1024 * 1024 * 1024);
//!
//! let sampler = Sampler::new(config)?;
//! sampler.start()?;
//!
//! // per request
//! if let Err(e) = sampler.check() {
//!     // e.is_overloaded() -> respond 503
//! }
//!
//! sampler.stop();
//! ```

mod task;

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SamplerConfig;
use crate::error::{Error, Result};
use crate::evaluator::evaluate;
use crate::load::Load;
use crate::system::{MemoryProbe, ProcessMemory, RuntimeUtilization, UtilizationProbe};

use task::{overrun_ms, Baseline, SamplerTask, SharedUtilization};

/// Sampler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SamplerState {
    /// `start()` has not been called yet.
    NotStarted = 0,
    /// Sampling (or trivially accepting when sampling is disabled).
    Running = 1,
    /// `stop()` has been called.
    Stopped = 2,
}

impl SamplerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SamplerState::Running,
            2 => SamplerState::Stopped,
            _ => SamplerState::NotStarted,
        }
    }
}

impl fmt::Display for SamplerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Cold-path state, only touched by `start()` and `stop()`.
#[derive(Default)]
struct Lifecycle {
    task: Option<JoinHandle<()>>,
    utilization: Option<SharedUtilization>,
}

/// Process load sampler.
pub struct Sampler {
    config: SamplerConfig,
    load: Arc<Load>,
    baseline: Arc<Baseline>,
    state: AtomicU8,
    memory: Arc<dyn MemoryProbe>,
    handle: Option<Handle>,
    lifecycle: Mutex<Lifecycle>,
}

impl Sampler {
    /// Create a sampler. Fails with `Error::Config` if the configuration is invalid.
    pub fn new(config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SamplerConfig) -> Self {
        Self {
            config,
            load: Arc::new(Load::new()),
            baseline: Arc::new(Baseline::new()),
            state: AtomicU8::new(SamplerState::NotStarted as u8),
            memory: Arc::new(ProcessMemory::new()),
            handle: None,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Spawn the sampler task on `handle` instead of the current runtime.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Replace the memory probe.
    pub fn with_memory_probe(mut self, probe: impl MemoryProbe + 'static) -> Self {
        self.memory = Arc::new(probe);
        self
    }

    /// Replace the utilization probe.
    ///
    /// By default utilization is read from the runtime the sampler task runs on.
    pub fn with_utilization_probe(mut self, probe: impl UtilizationProbe + 'static) -> Self {
        let probe: Box<dyn UtilizationProbe> = Box::new(probe);
        self.lifecycle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .utilization = Some(Arc::new(Mutex::new(probe)));
        self
    }

    /// Sampler configuration.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SamplerState {
        SamplerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Check if the sampler is running.
    pub fn is_running(&self) -> bool {
        self.state() == SamplerState::Running
    }

    /// The live load record.
    ///
    /// Always the same instance; it keeps updating while the sampler runs.
    pub fn load(&self) -> Arc<Load> {
        Arc::clone(&self.load)
    }

    /// Start sampling.
    ///
    /// Does nothing if already running. With sampling disabled it only marks
    /// the sampler as running. Otherwise the sampler task is spawned on the
    /// configured handle or the current runtime.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lock_lifecycle();

        if self.is_running() {
            debug!("load sampler already running");
            return Ok(());
        }

        if !self.config.is_sampling_enabled() {
            self.set_state(SamplerState::Running);
            debug!("load sampling disabled, all checks will pass");
            return Ok(());
        }

        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| Error::NoRuntime)?,
        };

        let utilization = lifecycle
            .utilization
            .get_or_insert_with(|| {
                let probe: Box<dyn UtilizationProbe> =
                    Box::new(RuntimeUtilization::new(handle.clone()));
                Arc::new(Mutex::new(probe))
            })
            .clone();

        // A probe kept across a restart must not average over the stopped period
        let supported = match utilization.lock() {
            Ok(mut probe) => {
                probe.reset();
                probe.is_supported()
            }
            Err(_) => false,
        };

        if self.config.max_event_loop_utilization > 0.0 && !supported {
            warn!(
                limit = self.config.max_event_loop_utilization,
                "event loop utilization is not available, limit will never trigger"
            );
        }

        self.baseline.reset();

        let task = SamplerTask {
            interval: self.config.sample_interval(),
            load: Arc::clone(&self.load),
            baseline: Arc::clone(&self.baseline),
            memory: Arc::clone(&self.memory),
            utilization,
        };
        lifecycle.task = Some(handle.spawn(task.run()));
        self.set_state(SamplerState::Running);

        info!(
            interval_ms = self.config.sample_interval_ms,
            "load sampler started"
        );
        Ok(())
    }

    /// Stop sampling.
    ///
    /// The pending tick is cancelled and never fires. Safe to call repeatedly
    /// or before `start()`.
    pub fn stop(&self) {
        let mut lifecycle = self.lock_lifecycle();

        if let Some(task) = lifecycle.task.take() {
            task.abort();
        }

        let previous = self.state.swap(SamplerState::Stopped as u8, Ordering::AcqRel);
        if SamplerState::from_u8(previous) == SamplerState::Running {
            info!("load sampler stopped");
        }
    }

    /// Decide whether to accept new work.
    ///
    /// Returns `Error::Overloaded` naming the first exceeded limit (delay,
    /// utilization, heap, rss), or `Error::NotRunning` if the sampler is not
    /// running. Never blocks.
    pub fn check(&self) -> Result<()> {
        let state = self.state();
        if state != SamplerState::Running {
            return Err(Error::NotRunning { state });
        }

        if !self.config.is_sampling_enabled() {
            return Ok(());
        }

        // The pending tick is overdue: the runtime is busy right now
        let overrun = overrun_ms(self.baseline.elapsed(), self.config.sample_interval());
        if overrun > 0.0 {
            self.load.raise_event_loop_delay_ms(overrun);
        }

        match evaluate(&self.config, &self.load.snapshot()) {
            Some(metric) => Err(Error::Overloaded { metric }),
            None => Ok(()),
        }
    }

    fn set_state(&self, state: SamplerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Sampler {
    /// A sampler with sampling disabled.
    fn default() -> Self {
        Self::build(SamplerConfig::default())
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        let lifecycle = self
            .lifecycle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = lifecycle.task.take() {
            task.abort();
        }
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("load", &self.load.snapshot())
            .finish()
    }
}
