//! The sweep engine.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use rowsweep_core::{ConfigError, Initializer, SweepError, Transform};
use rowsweep_grid::Grid;
use rowsweep_kernel::Stencil;
use rowsweep_space::PartitionScheme;

use crate::config::{ExecutionMode, SweepConfig};
use crate::hooks::{NoHooks, SweepHooks};
use crate::metrics::{micros, SweepMetrics};
use crate::{distributed, sequential, shared};

/// Inputs shared by every executor. Cloning only bumps reference
/// counts, so worker threads can each own one.
#[derive(Clone)]
pub(crate) struct Plan {
    pub(crate) stencil: Stencil,
    pub(crate) scheme: Arc<PartitionScheme>,
    pub(crate) transform: Arc<dyn Transform>,
    pub(crate) hooks: Arc<dyn SweepHooks>,
}

/// Counters an executor reports back.
#[derive(Default)]
pub(crate) struct RunStats {
    pub(crate) rows_computed: u64,
    pub(crate) cells_written: u64,
    pub(crate) exchange_wait: Duration,
}

/// Result of a successful sweep.
#[derive(Clone, Debug)]
pub struct SweepOutcome {
    /// The completed, read-only grid.
    pub grid: Grid,
    /// Timing and volume metrics of the run.
    pub metrics: SweepMetrics,
}

/// Runs row-sequential sweeps for one validated configuration.
///
/// The engine is reusable: every [`run`](Self::run) allocates a fresh
/// grid, so the same engine can sweep many initial conditions.
///
/// # Examples
///
/// ```
/// use rowsweep_engine::{ExecutionMode, SweepConfig, SweepEngine};
/// use rowsweep_kernel::{LinearRamp, ScaledSine};
///
/// let config = SweepConfig::new(16, 16)
///     .with_workers(4)
///     .with_mode(ExecutionMode::MessagePassing);
/// let engine = SweepEngine::new(config, ScaledSine::new(2.0)).unwrap();
/// let outcome = engine.run(&LinearRamp::default()).unwrap();
/// assert_eq!(outcome.grid.shape(), (16, 16));
/// assert_eq!(outcome.metrics.rows_computed, 15);
/// ```
pub struct SweepEngine {
    config: SweepConfig,
    scheme: Arc<PartitionScheme>,
    transform: Arc<dyn Transform>,
    hooks: Arc<dyn SweepHooks>,
}

impl fmt::Debug for SweepEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepEngine")
            .field("config", &self.config)
            .field("transform", &self.transform.name())
            .finish_non_exhaustive()
    }
}

impl SweepEngine {
    /// Validate `config` and take ownership of `transform`.
    pub fn new<T>(config: SweepConfig, transform: T) -> Result<Self, ConfigError>
    where
        T: Transform + 'static,
    {
        Self::with_shared_transform(config, Arc::new(transform))
    }

    /// Validate `config` with a transform shared with the caller.
    pub fn with_shared_transform(
        config: SweepConfig,
        transform: Arc<dyn Transform>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let scheme = config.partition_scheme()?;
        Ok(Self {
            config,
            scheme: Arc::new(scheme),
            transform,
            hooks: Arc::new(NoHooks),
        })
    }

    /// Install instrumentation hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn SweepHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// The partition table derived from the configuration.
    pub fn scheme(&self) -> &PartitionScheme {
        &self.scheme
    }

    /// Build the grid from `init`, then sweep it.
    ///
    /// Initialization is timed separately and excluded from
    /// [`SweepMetrics::total_us`].
    pub fn run<I>(&self, init: &I) -> Result<SweepOutcome, SweepError>
    where
        I: Initializer + ?Sized,
    {
        let started = Instant::now();
        let grid = Grid::from_initializer(self.config.rows, self.config.cols, init)?;
        let init_us = micros(started.elapsed());
        self.execute(grid, init_us)
    }

    /// Sweep an already initialized grid.
    ///
    /// The grid must have the configured shape and only finite values.
    pub fn run_grid(&self, grid: Grid) -> Result<SweepOutcome, SweepError> {
        let expected = (self.config.rows, self.config.cols);
        if grid.shape() != expected {
            return Err(ConfigError::ShapeMismatch {
                expected,
                actual: grid.shape(),
            }
            .into());
        }
        if let Some(pos) = grid.as_slice().iter().position(|v| !v.is_finite()) {
            let cols = self.config.cols;
            return Err(ConfigError::NonFiniteInitialValue {
                row: pos / cols,
                col: pos % cols,
                value: grid.as_slice()[pos],
            }
            .into());
        }
        self.execute(grid, 0)
    }

    fn execute(&self, grid: Grid, init_us: u64) -> Result<SweepOutcome, SweepError> {
        let plan = Plan {
            stencil: self.config.stencil,
            scheme: Arc::clone(&self.scheme),
            transform: Arc::clone(&self.transform),
            hooks: Arc::clone(&self.hooks),
        };
        let mode = self.config.mode;
        debug!(
            "sweep start: {}x{} grid, {} workers, {mode}, transform {}",
            self.config.rows,
            self.config.cols,
            self.config.workers,
            self.transform.name()
        );
        self.hooks.sweep_started(&self.config);

        let started = Instant::now();
        let (grid, stats) = match mode {
            ExecutionMode::Sequential => sequential::run(grid, &plan)?,
            ExecutionMode::SharedMemory => shared::run(grid, &plan)?,
            ExecutionMode::MessagePassing => {
                distributed::run(grid, &plan, self.config.receive_timeout)?
            }
        };
        let elapsed = started.elapsed();

        let metrics = SweepMetrics {
            total_us: micros(elapsed),
            init_us,
            exchange_wait_us: micros(stats.exchange_wait),
            rows_computed: stats.rows_computed,
            cells_written: stats.cells_written,
            workers: self.scheme.len(),
            mode,
        };
        debug!(
            "sweep done: {} rows, {} cells in {:?}",
            metrics.rows_computed, metrics.cells_written, elapsed
        );
        self.hooks.sweep_finished(&metrics);
        Ok(SweepOutcome { grid, metrics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsweep_kernel::{Identity, LinearRamp};

    #[test]
    fn invalid_config_rejected_at_construction() {
        let config = SweepConfig::new(4, 4).with_workers(5);
        match SweepEngine::new(config, Identity) {
            Err(ConfigError::TooManyWorkers { .. }) => {}
            other => panic!("expected TooManyWorkers, got {other:?}"),
        }
    }

    #[test]
    fn run_grid_checks_shape() {
        let engine = SweepEngine::new(SweepConfig::new(3, 3), Identity).unwrap();
        let grid = Grid::from_initializer(2, 3, &LinearRamp::default()).unwrap();
        match engine.run_grid(grid) {
            Err(SweepError::Config(ConfigError::ShapeMismatch { expected, actual })) => {
                assert_eq!(expected, (3, 3));
                assert_eq!(actual, (2, 3));
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn run_grid_rejects_non_finite_cells() {
        let engine = SweepEngine::new(SweepConfig::new(2, 2), Identity).unwrap();
        let grid = Grid::from_vec(2, 2, vec![0.0, 1.0, f64::INFINITY, 3.0]).unwrap();
        match engine.run_grid(grid) {
            Err(SweepError::Config(ConfigError::NonFiniteInitialValue { row: 1, col: 0, .. })) => {}
            other => panic!("expected NonFiniteInitialValue, got {other:?}"),
        }
    }

    #[test]
    fn metrics_describe_the_run() {
        let config = SweepConfig::new(6, 5)
            .with_workers(2)
            .with_mode(ExecutionMode::Sequential);
        let engine = SweepEngine::new(config, Identity).unwrap();
        let out = engine.run(&LinearRamp::default()).unwrap();
        assert_eq!(out.metrics.rows_computed, 5);
        // offset +1 with Skip leaves the last column of each row alone
        assert_eq!(out.metrics.cells_written, 5 * 4);
        assert_eq!(out.metrics.workers, 2);
        assert_eq!(out.metrics.mode, ExecutionMode::Sequential);
        assert_eq!(out.metrics.exchange_wait_us, 0);
    }

    #[test]
    fn debug_names_the_transform() {
        let engine = SweepEngine::new(SweepConfig::new(2, 2), Identity).unwrap();
        assert!(format!("{engine:?}").contains("identity"));
    }
}
