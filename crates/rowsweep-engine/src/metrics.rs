//! Timing and volume metrics for one sweep.

use std::time::Duration;

use crate::config::ExecutionMode;

/// Metrics collected during a single sweep.
///
/// All durations are in microseconds. `total_us` brackets only the
/// transform loop: grid initialization is reported separately in
/// `init_us` and result persistence is never timed by the engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepMetrics {
    /// Wall-clock time of the transform loop, in microseconds.
    pub total_us: u64,
    /// Time spent building the initial grid, in microseconds.
    pub init_us: u64,
    /// Time the coordinator spent blocked on other workers, in
    /// microseconds. Zero outside message-passing mode.
    pub exchange_wait_us: u64,
    /// Number of rows written.
    pub rows_computed: u64,
    /// Number of cells written across all workers. Cells skipped by the
    /// edge policy are not counted.
    pub cells_written: u64,
    /// Number of workers.
    pub workers: usize,
    /// Executor that produced the result.
    pub mode: ExecutionMode,
}

impl SweepMetrics {
    /// The transform loop's elapsed time.
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.total_us)
    }
}

pub(crate) fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}
