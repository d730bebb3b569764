//! Instrumentation callbacks.

use rowsweep_core::RowIndex;

use crate::config::SweepConfig;
use crate::metrics::SweepMetrics;

/// Observer of a sweep's progress.
///
/// Hooks run on the thread that finalizes the row: the calling thread
/// in sequential and shared-memory mode, the coordinator's worker
/// thread in message-passing mode. They must be cheap; they sit inside
/// the timed transform loop.
pub trait SweepHooks: Send + Sync {
    /// Called once before the transform loop starts.
    fn sweep_started(&self, _config: &SweepConfig) {}

    /// Called after each row is finalized, in row order.
    fn row_finalized(&self, _row: RowIndex) {}

    /// Called once with the final metrics of a successful sweep.
    fn sweep_finished(&self, _metrics: &SweepMetrics) {}
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl SweepHooks for NoHooks {}
