//! End-to-end sweeps against hand-computed and classic loop results.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rowsweep_core::{ConfigError, ErrorKind, RowIndex, SweepError, WorkerId};
use rowsweep_engine::{ExecutionMode, SweepConfig, SweepEngine, SweepHooks, SweepMetrics};
use rowsweep_kernel::{Identity, LinearRamp, ScaledSine, Stencil};
use rowsweep_space::EdgePolicy;
use rowsweep_test_utils::{grid_from_rows, CountingTransform, FirstRowInit};

const MODES: [ExecutionMode; 3] = [
    ExecutionMode::MessagePassing,
    ExecutionMode::SharedMemory,
    ExecutionMode::Sequential,
];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ramp(rows: usize, cols: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|i| (0..cols).map(|j| (10 * i + j) as f64).collect())
        .collect()
}

// ── Hand-computed ───────────────────────────────────────────────

#[test]
fn four_by_four_edge_policies() {
    init_logging();
    let cases = [
        (EdgePolicy::Skip, 9.0),
        (EdgePolicy::Clamp, 3.0),
        (EdgePolicy::Wrap, 0.0),
    ];
    for mode in MODES {
        for (edge, last) in cases {
            let config = SweepConfig::new(4, 4)
                .with_workers(2)
                .with_edge(edge)
                .with_mode(mode);
            let engine = SweepEngine::new(config, Identity).unwrap();
            let out = engine
                .run(&FirstRowInit::new(vec![0.0, 1.0, 2.0, 3.0], 9.0))
                .unwrap();
            assert_eq!(
                out.grid.row(1).unwrap(),
                &[1.0, 2.0, 3.0, last],
                "{mode} with {edge:?}"
            );
        }
    }
}

#[test]
fn skip_leaves_initial_values_in_the_edge_column() {
    let config = SweepConfig::new(4, 4)
        .with_workers(2)
        .with_mode(ExecutionMode::MessagePassing);
    let out = SweepEngine::new(config, Identity)
        .unwrap()
        .run(&FirstRowInit::new(vec![0.0, 1.0, 2.0, 3.0], 9.0))
        .unwrap();
    let rows: Vec<&[f64]> = out.grid.iter_rows().collect();
    assert_eq!(rows[2], &[2.0, 3.0, 9.0, 9.0]);
    assert_eq!(rows[3], &[3.0, 9.0, 9.0, 9.0]);
}

// ── Classic loops ───────────────────────────────────────────────

/// `a[i][j] = sin(2 * a[i-1][j+1])` for `j < cols - 1`.
#[test]
fn carried_sine_matches_the_serial_loop() {
    let (rows, cols) = (12, 11);
    let mut a = ramp(rows, cols);
    for i in 1..rows {
        for j in 0..cols - 1 {
            a[i][j] = (2.0 * a[i - 1][j + 1]).sin();
        }
    }
    let expected: Vec<f64> = a.concat();

    for mode in MODES {
        let config = SweepConfig::new(rows, cols).with_workers(3).with_mode(mode);
        let out = SweepEngine::new(config, ScaledSine::new(2.0))
            .unwrap()
            .run(&LinearRamp::default())
            .unwrap();
        assert_eq!(out.grid.as_slice(), &expected[..], "{mode}");
    }
}

/// `a[i][j] = sin(0.2 * a[i+1][j-6])` for `i < rows - 1`, `j >= 6`.
#[test]
fn lookahead_sine_matches_the_serial_loop() {
    let (rows, cols) = (9, 14);
    let mut a = ramp(rows, cols);
    for i in 0..rows - 1 {
        for j in 6..cols {
            a[i][j] = (0.2 * a[i + 1][j - 6]).sin();
        }
    }
    let expected: Vec<f64> = a.concat();

    for mode in MODES {
        let config = SweepConfig::new(rows, cols)
            .with_workers(4)
            .with_stencil(Stencil::lookahead(-6))
            .with_mode(mode);
        let out = SweepEngine::new(config, ScaledSine::new(0.2))
            .unwrap()
            .run(&LinearRamp::default())
            .unwrap();
        assert_eq!(out.grid.as_slice(), &expected[..], "{mode}");
        assert_eq!(out.metrics.rows_computed, (rows - 1) as u64);
    }
}

/// `a[i][j] = sin(2 * a[i][j])` everywhere.
#[test]
fn pointwise_sine_touches_every_cell() {
    let (rows, cols) = (5, 8);
    let expected: Vec<f64> = ramp(rows, cols)
        .concat()
        .into_iter()
        .map(|x| (2.0 * x).sin())
        .collect();

    for mode in MODES {
        let config = SweepConfig::new(rows, cols)
            .with_workers(3)
            .with_stencil(Stencil::pointwise())
            .with_mode(mode);
        let out = SweepEngine::new(config, ScaledSine::new(2.0))
            .unwrap()
            .run(&LinearRamp::default())
            .unwrap();
        assert_eq!(out.grid.as_slice(), &expected[..], "{mode}");
        assert_eq!(out.metrics.cells_written, (rows * cols) as u64);
    }
}

// ── Engine surface ──────────────────────────────────────────────

#[test]
fn too_many_workers_is_a_configuration_error() {
    let config = SweepConfig::new(8, 3).with_workers(4);
    let err = SweepEngine::new(config, Identity).unwrap_err();
    assert!(matches!(err, ConfigError::TooManyWorkers { workers: 4, cols: 3 }));
    assert_eq!(SweepError::from(err).kind(), ErrorKind::Configuration);
}

#[test]
fn engine_is_reusable_and_runs_prepared_grids() {
    let config = SweepConfig::new(3, 3)
        .with_workers(3)
        .with_coordinator(WorkerId(1));
    let engine = SweepEngine::new(config, Identity).unwrap();

    let first = engine
        .run_grid(grid_from_rows(&[&[1.0, 2.0, 3.0], &[0.0; 3], &[0.0; 3]]))
        .unwrap();
    assert_eq!(first.grid.row(2).unwrap(), &[3.0, 0.0, 0.0]);

    let second = engine
        .run_grid(grid_from_rows(&[&[4.0, 5.0, 6.0], &[0.0; 3], &[0.0; 3]]))
        .unwrap();
    assert_eq!(second.grid.row(1).unwrap(), &[5.0, 6.0, 0.0]);
}

#[test]
fn every_cell_is_computed_exactly_once() {
    let counter = Arc::new(CountingTransform::new());
    let config = SweepConfig::new(7, 10)
        .with_workers(4)
        .with_mode(ExecutionMode::SharedMemory);
    let engine = SweepEngine::with_shared_transform(config, counter.clone()).unwrap();
    let out = engine.run(&LinearRamp::default()).unwrap();
    assert_eq!(counter.calls(), 6 * 9);
    assert_eq!(out.metrics.cells_written, 6 * 9);
}

#[test]
fn shared_lookahead_computes_each_cell_once_in_place() {
    let counter = Arc::new(CountingTransform::new());
    let config = SweepConfig::new(7, 10)
        .with_workers(3)
        .with_stencil(Stencil::lookahead(-6))
        .with_mode(ExecutionMode::SharedMemory);
    let engine = SweepEngine::with_shared_transform(config, counter.clone()).unwrap();
    let out = engine.run(&LinearRamp::default()).unwrap();
    assert_eq!(counter.calls(), 6 * 4);
    // row 0 takes row 1's pre-sweep values, not its updated ones
    assert_eq!(out.grid.row(0).unwrap()[6..], [10.0, 11.0, 12.0, 13.0]);
    let last: Vec<f64> = (60..70).map(f64::from).collect();
    assert_eq!(out.grid.row(6).unwrap(), &last[..]);
}

// ── Hooks ───────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingHooks {
    started: AtomicUsize,
    rows: Mutex<Vec<RowIndex>>,
    finished: Mutex<Option<SweepMetrics>>,
}

impl SweepHooks for RecordingHooks {
    fn sweep_started(&self, _config: &SweepConfig) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    fn row_finalized(&self, row: RowIndex) {
        self.rows.lock().unwrap().push(row);
    }

    fn sweep_finished(&self, metrics: &SweepMetrics) {
        *self.finished.lock().unwrap() = Some(metrics.clone());
    }
}

#[test]
fn hooks_see_rows_in_order() {
    for mode in MODES {
        let hooks = Arc::new(RecordingHooks::default());
        let config = SweepConfig::new(6, 6).with_workers(2).with_mode(mode);
        let out = SweepEngine::new(config, Identity)
            .unwrap()
            .with_hooks(hooks.clone())
            .run(&LinearRamp::default())
            .unwrap();

        assert_eq!(hooks.started.load(Ordering::Relaxed), 1);
        let rows = hooks.rows.lock().unwrap().clone();
        assert_eq!(rows, (1..6).map(RowIndex).collect::<Vec<_>>(), "{mode}");
        let finished = hooks.finished.lock().unwrap().clone();
        assert_eq!(finished, Some(out.metrics));
    }
}
