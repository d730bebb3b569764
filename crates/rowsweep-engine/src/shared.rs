//! Shared-memory executor over a rayon pool.

use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use rowsweep_core::{ConfigError, RowIndex, SweepError};
use rowsweep_grid::{Grid, GridStore};
use rowsweep_kernel::Worker;
use rowsweep_space::Partition;

use crate::engine::{Plan, RunStats};

/// Sweep on a dedicated pool of `plan.scheme.len()` threads.
///
/// Rows are written in place one at a time; the row's partitions run in
/// parallel over disjoint slices and the end of the parallel iterator
/// is the barrier. A lookahead source row is still
/// [`Initial`](rowsweep_grid::RowState::Initial) when its target is
/// written, so every stencil sweeps without a second copy of the grid.
pub(crate) fn run(grid: Grid, plan: &Plan) -> Result<(Grid, RunStats), SweepError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(plan.scheme.len())
        .thread_name(|i| format!("rowsweep-pool-{i}"))
        .build()
        .map_err(|e| ConfigError::ThreadPoolBuildFailed {
            reason: e.to_string(),
        })?;

    let mut store = GridStore::new(grid);
    let stats = pool.install(|| sweep_rows(&mut store, plan))?;
    Ok((store.finish()?, stats))
}

fn sweep_rows(store: &mut GridStore, plan: &Plan) -> Result<RunStats, SweepError> {
    let cols = store.cols();
    let mut stats = RunStats::default();

    for i in plan.stencil.target_rows(store.rows()) {
        let row = RowIndex(i);
        let mut guard = match plan.stencil.source_row(row) {
            Some(src) => store.begin_row_from(row, src)?,
            None => store.begin_row(row)?,
        };
        let (source, values) = guard.parts_mut();

        let mut segments: Vec<(&Partition, &mut [f64])> = Vec::with_capacity(plan.scheme.len());
        let mut rest = values;
        for p in plan.scheme.iter() {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(p.len());
            segments.push((p, head));
            rest = tail;
        }

        let written = segments
            .into_par_iter()
            .map(|(p, seg)| {
                let worker = Worker::new(*p, cols, plan.stencil, plan.transform.as_ref());
                panic::catch_unwind(AssertUnwindSafe(|| worker.compute_segment(source, seg)))
                    .map_err(|_| SweepError::WorkerPanicked { worker: p.worker })?
                    .map_err(SweepError::from)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))?;

        guard.commit();
        stats.cells_written += written as u64;
        stats.rows_computed += 1;
        plan.hooks.row_finalized(row);
    }
    Ok(stats)
}
