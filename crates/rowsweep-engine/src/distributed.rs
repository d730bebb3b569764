//! Message-passing executor: one thread and one private grid per worker.
//!
//! Worker threads own everything they touch, so the engine never has to
//! join them. Each one reports on a result channel; once a failure has
//! been reported, workers that stay silent past the receive timeout are
//! left running detached and the run returns without them.

use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use log::{debug, warn};
use rowsweep_core::{CommunicationError, ConfigError, RowIndex, SweepError, WorkerId};
use rowsweep_grid::{Grid, GridStore};
use rowsweep_kernel::Worker;
use rowsweep_space::Partition;
use rowsweep_sync::{mesh, Endpoint, RowExchange, Segment};

use crate::engine::{Plan, RunStats};

/// What a worker thread hands back when it finishes cleanly.
struct WorkerOutput {
    grid: Option<Grid>,
    cells_written: u64,
    rows_computed: u64,
    waited: Duration,
}

type Report = (WorkerId, Result<WorkerOutput, SweepError>);

/// Run every worker on its own named thread and collect their reports.
///
/// Each worker starts from a private copy of `grid`; all copies are
/// reserved before the first thread starts. Only the coordinator's copy
/// is complete at the end; it becomes the result.
pub(crate) fn run(
    grid: Grid,
    plan: &Plan,
    timeout: Duration,
) -> Result<(Grid, RunStats), SweepError> {
    let workers = plan.scheme.len();
    let mut grids = Vec::with_capacity(workers);
    for _ in 1..workers {
        grids.push(grid.try_clone()?);
    }
    grids.push(grid);

    let (report_tx, report_rx) = bounded::<Report>(workers);
    let mut spawned = 0;
    for (ep, grid) in mesh(&plan.scheme, timeout).into_iter().zip(grids) {
        let id = ep.worker();
        let Some(part) = plan.scheme.partition(id).copied() else {
            continue;
        };
        let plan = plan.clone();
        let report = report_tx.clone();
        let started = thread::Builder::new()
            .name(format!("rowsweep-worker-{id}"))
            .spawn(move || {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| worker_main(ep, part, grid, &plan)))
                        .unwrap_or(Err(SweepError::WorkerPanicked { worker: id }));
                // Nobody is listening if the run already detached this worker.
                let _ = report.send((id, outcome));
            });
        if let Err(e) = started {
            // The unspawned endpoints drop with the iterator, which
            // disconnects the workers already running.
            return Err(ConfigError::ThreadSpawnFailed {
                reason: format!("rowsweep-worker-{id}: {e}"),
            }
            .into());
        }
        spawned += 1;
    }
    drop(report_tx);

    let mut reports = collect_reports(&report_rx, spawned, timeout);
    if reports.len() < spawned {
        let silent: Vec<WorkerId> = plan
            .scheme
            .iter()
            .map(|p| p.worker)
            .filter(|w| reports.iter().all(|(id, _)| id != w))
            .collect();
        warn!("detaching unresponsive workers {silent:?}");
    }
    reports.sort_by_key(|(id, _)| *id);

    if let Some(e) = primary_error(&reports, plan.scheme.coordinator()) {
        return Err(e);
    }

    let mut stats = RunStats::default();
    let mut result = None;
    for (_, outcome) in reports {
        let Ok(out) = outcome else { continue };
        stats.cells_written += out.cells_written;
        if let Some(g) = out.grid {
            stats.rows_computed = out.rows_computed;
            stats.exchange_wait = out.waited;
            result = Some(g);
        }
    }
    match result {
        Some(g) => Ok((g, stats)),
        None => Err(SweepError::WorkerPanicked {
            worker: plan.scheme.coordinator(),
        }),
    }
}

/// Receive up to `expected` reports.
///
/// Without failures this waits for everyone. The first failed report
/// starts a `grace` deadline; whoever has not reported by then is left
/// behind.
fn collect_reports(rx: &Receiver<Report>, expected: usize, grace: Duration) -> Vec<Report> {
    let mut reports = Vec::with_capacity(expected);
    let mut deadline: Option<Instant> = None;
    while reports.len() < expected {
        let next = match deadline {
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            Some(d) => rx.recv_timeout(d.saturating_duration_since(Instant::now())),
        };
        let Ok(report) = next else { break };
        if deadline.is_none() && report.1.is_err() {
            deadline = Some(Instant::now() + grace);
        }
        reports.push(report);
    }
    reports
}

/// Pick the error that explains the failure.
///
/// Panics come first, then root causes (anything other than an abort
/// or disconnect, which are consequences), then the coordinator's view,
/// then whatever is left.
fn primary_error(outcomes: &[Report], coordinator: WorkerId) -> Option<SweepError> {
    let errors: Vec<(WorkerId, &SweepError)> = outcomes
        .iter()
        .filter_map(|(id, r)| r.as_ref().err().map(|e| (*id, e)))
        .collect();

    let is_consequence = |e: &SweepError| {
        matches!(
            e,
            SweepError::Communication(
                CommunicationError::Aborted { .. } | CommunicationError::Disconnected { .. }
            )
        )
    };

    errors
        .iter()
        .find(|(_, e)| matches!(e, SweepError::WorkerPanicked { .. }))
        .or_else(|| errors.iter().find(|(_, e)| !is_consequence(*e)))
        .or_else(|| errors.iter().find(|(id, _)| *id == coordinator))
        .or_else(|| errors.first())
        .map(|(_, e)| SweepError::clone(e))
}

fn worker_main(
    mut ep: Endpoint,
    part: Partition,
    grid: Grid,
    plan: &Plan,
) -> Result<WorkerOutput, SweepError> {
    let id = ep.worker();
    let mut store = GridStore::new(grid);
    let worker = Worker::new(part, store.cols(), plan.stencil, plan.transform.as_ref());
    let coordinating = ep.is_coordinator();
    let mut out = WorkerOutput {
        grid: None,
        cells_written: 0,
        rows_computed: 0,
        waited: Duration::ZERO,
    };

    for i in plan.stencil.target_rows(store.rows()) {
        let row = RowIndex(i);
        match step(&mut ep, &mut store, &worker, plan, row) {
            Ok(written) => out.cells_written += written,
            Err(e) => {
                // Protocol failures have already been propagated by the
                // endpoint; local failures still need to reach the peers.
                if !matches!(e, SweepError::Communication(_)) {
                    ep.abort(row);
                }
                debug!("worker {id} stopped at row {row}: {e}");
                return Err(e);
            }
        }
        out.rows_computed += 1;
        if coordinating {
            plan.hooks.row_finalized(row);
        }
    }

    ep.complete()?;
    out.waited = ep.waited();
    if coordinating {
        out.grid = Some(store.finish()?);
    }
    debug!(
        "worker {id} finished: {} rows, {} cells",
        out.rows_computed, out.cells_written
    );
    Ok(out)
}

/// Compute this worker's segment of `row`, then merge it with the
/// others. Returns the number of cells written locally.
fn step(
    ep: &mut Endpoint,
    store: &mut GridStore,
    worker: &Worker<'_>,
    plan: &Plan,
    row: RowIndex,
) -> Result<u64, SweepError> {
    let part = worker.partition();
    let source = match plan.stencil.source_row(row) {
        Some(src) => Some(store.finalized_row(src)?),
        None => None,
    };
    let mut values = store.finalized_row(row)?[part.range()].to_vec();
    let written = worker.compute_segment(source, &mut values)?;

    let segment = Segment {
        sender: worker.id(),
        row,
        start: part.start,
        values,
    };
    if plan.stencil.is_carried() {
        let merged = ep.exchange(segment)?;
        store.install_row(row, &merged)?;
    } else if let Some(merged) = ep.gather(segment)? {
        store.install_row(row, &merged)?;
    }
    Ok(written as u64)
}
