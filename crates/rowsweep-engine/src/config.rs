//! Sweep configuration and validation.

use std::fmt;
use std::time::Duration;

use rowsweep_core::{ConfigError, WorkerId};
use rowsweep_kernel::Stencil;
use rowsweep_space::{EdgePolicy, PartitionScheme};
use rowsweep_sync::DEFAULT_RECEIVE_TIMEOUT;

/// How the workers of a sweep are executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    /// One OS thread per worker, private grids, channel-based row merge.
    #[default]
    MessagePassing,
    /// A rayon pool over one shared grid.
    SharedMemory,
    /// Single-threaded reference execution.
    Sequential,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessagePassing => write!(f, "message-passing"),
            Self::SharedMemory => write!(f, "shared-memory"),
            Self::Sequential => write!(f, "sequential"),
        }
    }
}

/// Everything a sweep needs besides its collaborators.
///
/// [`validate()`](Self::validate) checks every field before anything is
/// allocated.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use rowsweep_engine::{ExecutionMode, SweepConfig};
/// use rowsweep_space::EdgePolicy;
///
/// let config = SweepConfig::new(100, 64)
///     .with_workers(4)
///     .with_mode(ExecutionMode::SharedMemory)
///     .with_edge(EdgePolicy::Clamp)
///     .with_receive_timeout(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SweepConfig {
    /// Grid rows. Default: 5000.
    pub rows: usize,
    /// Grid columns. Default: 5000.
    pub cols: usize,
    /// Number of workers (partitions). Default: 1.
    pub workers: usize,
    /// Row source, column offset, and edge policy. Default: previous
    /// row, offset `+1`, [`EdgePolicy::Skip`].
    pub stencil: Stencil,
    /// Executor. Default: [`ExecutionMode::MessagePassing`].
    pub mode: ExecutionMode,
    /// Bound on every protocol receive. Default: 30 s.
    pub receive_timeout: Duration,
    /// Worker that merges rows. Default: worker 0.
    pub coordinator: WorkerId,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            rows: 5000,
            cols: 5000,
            workers: 1,
            stencil: Stencil::default(),
            mode: ExecutionMode::default(),
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            coordinator: WorkerId(0),
        }
    }
}

impl SweepConfig {
    /// Default configuration for a `rows × cols` grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the stencil.
    pub fn with_stencil(mut self, stencil: Stencil) -> Self {
        self.stencil = stencil;
        self
    }

    /// Set only the stencil's edge policy.
    pub fn with_edge(mut self, edge: EdgePolicy) -> Self {
        self.stencil.edge = edge;
        self
    }

    /// Set the execution mode.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the protocol receive timeout.
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Set the coordinating worker.
    pub fn with_coordinator(mut self, worker: WorkerId) -> Self {
        self.coordinator = worker;
        self
    }

    /// Check structural invariants. Nothing is allocated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Non-empty grid.
        if self.rows == 0 {
            return Err(ConfigError::ZeroDimension { name: "rows" });
        }
        if self.cols == 0 {
            return Err(ConfigError::ZeroDimension { name: "cols" });
        }
        // 2. At least one worker, and no empty partitions.
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.workers > self.cols {
            return Err(ConfigError::TooManyWorkers {
                workers: self.workers,
                cols: self.cols,
            });
        }
        // 3. Coordinator must be one of the workers.
        if self.coordinator.index() >= self.workers {
            return Err(ConfigError::UnknownWorker {
                worker: self.coordinator,
                workers: self.workers,
            });
        }
        // 4. Stencil consistency.
        self.stencil.validate()?;
        // 5. A zero timeout would fail every exchange immediately.
        if self.receive_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Build the partition table for this configuration.
    pub fn partition_scheme(&self) -> Result<PartitionScheme, ConfigError> {
        PartitionScheme::new(self.cols, self.workers)?.with_coordinator(self.coordinator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SweepConfig {
        SweepConfig::new(8, 8).with_workers(2)
    }

    #[test]
    fn defaults_match_the_reference_run() {
        let c = SweepConfig::default();
        assert_eq!((c.rows, c.cols, c.workers), (5000, 5000, 1));
        assert_eq!(c.stencil, Stencil::carried(1));
        assert_eq!(c.stencil.edge, EdgePolicy::Skip);
        assert_eq!(c.receive_timeout, Duration::from_secs(30));
        assert_eq!(c.coordinator, WorkerId(0));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn validate_valid_config_succeeds() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_zero_rows_fails() {
        let mut c = valid();
        c.rows = 0;
        match c.validate() {
            Err(ConfigError::ZeroDimension { name: "rows" }) => {}
            other => panic!("expected ZeroDimension(rows), got {other:?}"),
        }
    }

    #[test]
    fn validate_zero_workers_fails() {
        match valid().with_workers(0).validate() {
            Err(ConfigError::NoWorkers) => {}
            other => panic!("expected NoWorkers, got {other:?}"),
        }
    }

    #[test]
    fn validate_more_workers_than_columns_fails() {
        match SweepConfig::new(4, 4).with_workers(5).validate() {
            Err(ConfigError::TooManyWorkers {
                workers: 5,
                cols: 4,
            }) => {}
            other => panic!("expected TooManyWorkers, got {other:?}"),
        }
    }

    #[test]
    fn validate_unknown_coordinator_fails() {
        match valid().with_coordinator(WorkerId(2)).validate() {
            Err(ConfigError::UnknownWorker { .. }) => {}
            other => panic!("expected UnknownWorker, got {other:?}"),
        }
    }

    #[test]
    fn validate_pointwise_offset_fails() {
        let mut stencil = Stencil::pointwise();
        stencil.offset = -1;
        match valid().with_stencil(stencil).validate() {
            Err(ConfigError::InvalidStencil { .. }) => {}
            other => panic!("expected InvalidStencil, got {other:?}"),
        }
    }

    #[test]
    fn validate_zero_timeout_fails() {
        match valid().with_receive_timeout(Duration::ZERO).validate() {
            Err(ConfigError::ZeroTimeout) => {}
            other => panic!("expected ZeroTimeout, got {other:?}"),
        }
    }

    #[test]
    fn partition_scheme_honours_coordinator() {
        let scheme = valid()
            .with_coordinator(WorkerId(1))
            .partition_scheme()
            .unwrap();
        assert_eq!(scheme.len(), 2);
        assert_eq!(scheme.coordinator(), WorkerId(1));
    }

    #[test]
    fn mode_display() {
        assert_eq!(ExecutionMode::SharedMemory.to_string(), "shared-memory");
    }
}
