//! Failure handling: timeouts, panics and unresponsive workers.

use std::time::{Duration, Instant};

use rowsweep_core::{CommunicationError, ErrorKind, RowIndex, SweepError, Transform, WorkerId};
use rowsweep_engine::{ExecutionMode, SweepConfig, SweepEngine};
use rowsweep_kernel::{transform_fn, LinearRamp};
use rowsweep_test_utils::fixtures::worker_thread;
use rowsweep_test_utils::{PanicOnThread, StallOnThread};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(timeout: Duration) -> SweepConfig {
    SweepConfig::new(6, 9)
        .with_workers(3)
        .with_mode(ExecutionMode::MessagePassing)
        .with_receive_timeout(timeout)
}

// ── Message passing ────────────────────────────────────────────

#[test]
fn silent_worker_times_out() {
    init_logging();
    // The stalled worker is still asleep long after the run returns.
    let stall = StallOnThread::new(worker_thread(1), Duration::from_secs(10));
    let engine = SweepEngine::new(config(Duration::from_millis(100)), stall).unwrap();

    let started = Instant::now();
    let result = engine.run(&LinearRamp::default());
    let elapsed = started.elapsed();
    assert!(elapsed < Duration::from_secs(2), "returned after {elapsed:?}");

    match result {
        Err(SweepError::Communication(CommunicationError::Timeout {
            row, unreachable, ..
        })) => {
            assert_eq!(row, RowIndex(1));
            assert_eq!(unreachable, vec![WorkerId(1)]);
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[test]
fn timeout_is_classified_as_communication() {
    let stall = StallOnThread::new(worker_thread(2), Duration::from_millis(400));
    let engine = SweepEngine::new(config(Duration::from_millis(80)), stall).unwrap();
    let err = engine.run(&LinearRamp::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Communication);
    assert!(err.to_string().contains("partition unreachable"));
}

#[test]
fn panicking_worker_aborts_the_run() {
    init_logging();
    let engine = SweepEngine::new(
        config(Duration::from_secs(10)),
        PanicOnThread::new(worker_thread(2)),
    )
    .unwrap();

    let started = Instant::now();
    match engine.run(&LinearRamp::default()) {
        Err(SweepError::WorkerPanicked { worker }) => assert_eq!(worker, WorkerId(2)),
        other => panic!("expected WorkerPanicked, got {other:?}"),
    }
    // the panic is noticed through the closed channel, not the timeout
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn coordinator_panic_is_reported() {
    let engine = SweepEngine::new(
        config(Duration::from_secs(10)),
        PanicOnThread::new(worker_thread(0)),
    )
    .unwrap();
    match engine.run(&LinearRamp::default()) {
        Err(SweepError::WorkerPanicked { worker }) => assert_eq!(worker, WorkerId(0)),
        other => panic!("expected WorkerPanicked, got {other:?}"),
    }
}

// ── Every mode ─────────────────────────────────────────────────

/// Identity until it meets a value above 20, which on the 6×9 ramp
/// first happens at row 3, column 7 (worker 2's partition).
fn explodes_above_twenty() -> impl Transform {
    transform_fn("explodes_above_twenty", |x| {
        if x > 20.0 {
            panic!("value {x} out of range");
        }
        x
    })
}

#[test]
fn panicking_transform_is_an_error_in_every_mode() {
    init_logging();
    let cases = [
        (ExecutionMode::MessagePassing, WorkerId(2)),
        (ExecutionMode::SharedMemory, WorkerId(2)),
        (ExecutionMode::Sequential, WorkerId(0)),
    ];
    for (mode, expected) in cases {
        let config = config(Duration::from_secs(10)).with_mode(mode);
        let engine = SweepEngine::new(config, explodes_above_twenty()).unwrap();
        match engine.run(&LinearRamp::default()) {
            Err(SweepError::WorkerPanicked { worker }) => assert_eq!(worker, expected, "{mode}"),
            other => panic!("{mode}: expected WorkerPanicked, got {other:?}"),
        }
    }
}

#[test]
fn engine_survives_a_panicked_run() {
    let config = config(Duration::from_secs(10)).with_mode(ExecutionMode::SharedMemory);
    let engine = SweepEngine::new(config, explodes_above_twenty()).unwrap();
    assert!(engine.run(&LinearRamp::default()).is_err());

    // a grid whose values stay small sweeps cleanly on the same engine
    let out = engine.run(&|_: usize, j: usize| j as f64).unwrap();
    assert_eq!(out.metrics.rows_computed, 5);
}
