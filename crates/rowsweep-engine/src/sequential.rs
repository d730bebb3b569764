//! Single-threaded reference executor.

use std::panic::{self, AssertUnwindSafe};

use rowsweep_core::{RowIndex, SweepError, WorkerId};
use rowsweep_grid::{Grid, GridStore};
use rowsweep_kernel::Worker;

use crate::engine::{Plan, RunStats};

/// Sweep every target row in order on the calling thread.
///
/// A panicking transform ends the run with
/// [`SweepError::WorkerPanicked`] naming worker 0.
pub(crate) fn run(grid: Grid, plan: &Plan) -> Result<(Grid, RunStats), SweepError> {
    let mut store = GridStore::new(grid);
    let cols = store.cols();
    let worker = Worker::full_width(cols, plan.stencil, plan.transform.as_ref());
    let mut stats = RunStats::default();

    for i in plan.stencil.target_rows(store.rows()) {
        let row = RowIndex(i);
        let mut guard = match plan.stencil.source_row(row) {
            Some(src) => store.begin_row_from(row, src)?,
            None => store.begin_row(row)?,
        };
        let (source, values) = guard.parts_mut();
        let written = panic::catch_unwind(AssertUnwindSafe(|| {
            worker.compute_segment(source, values)
        }))
        .map_err(|_| SweepError::WorkerPanicked {
            worker: WorkerId(0),
        })??;
        stats.cells_written += written as u64;
        guard.commit();
        stats.rows_computed += 1;
        plan.hooks.row_finalized(row);
    }

    Ok((store.finish()?, stats))
}
