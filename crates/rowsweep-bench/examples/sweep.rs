//! Run one sweep from the command line and optionally save the grid.
//!
//! ```text
//! cargo run --release -p rowsweep-bench --example sweep -- \
//!     [rows] [cols] [workers] [message-passing|shared-memory|sequential] [out.txt]
//! ```
//!
//! Defaults reproduce the classic run: 5000 × 5000, one worker,
//! `a[i][j] = sin(2 * a[i-1][j+1])` over the `10*i + j` ramp. Set
//! `RUST_LOG=debug` to see the protocol phases.

use std::process::ExitCode;

use log::{error, info};
use rowsweep_bench::reference_config;
use rowsweep_engine::{ExecutionMode, SweepEngine};
use rowsweep_kernel::{LinearRamp, ScaledSine};

fn parse_mode(s: &str) -> Option<ExecutionMode> {
    match s {
        "message-passing" | "mp" => Some(ExecutionMode::MessagePassing),
        "shared-memory" | "shm" => Some(ExecutionMode::SharedMemory),
        "sequential" | "seq" => Some(ExecutionMode::Sequential),
        _ => None,
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut config = reference_config(1, ExecutionMode::default());
    let numbers = [&mut config.rows, &mut config.cols, &mut config.workers];
    for (slot, arg) in numbers.into_iter().zip(&args) {
        match arg.parse() {
            Ok(n) => *slot = n,
            Err(e) => {
                error!("bad number {arg:?}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    if let Some(arg) = args.get(3) {
        match parse_mode(arg) {
            Some(mode) => config.mode = mode,
            None => {
                error!("unknown mode {arg:?}");
                return ExitCode::FAILURE;
            }
        }
    }

    let engine = match SweepEngine::new(config, ScaledSine::new(2.0)) {
        Ok(engine) => engine,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let outcome = match engine.run(&LinearRamp::default()) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("sweep failed ({:?}): {e}", e.kind());
            return ExitCode::FAILURE;
        }
    };

    let m = &outcome.metrics;
    println!(
        "{}x{} grid, {} workers, {}: {:.6} s (init {:.6} s, waiting {:.6} s)",
        outcome.grid.rows(),
        outcome.grid.cols(),
        m.workers,
        m.mode,
        m.total_us as f64 / 1e6,
        m.init_us as f64 / 1e6,
        m.exchange_wait_us as f64 / 1e6,
    );

    if let Some(path) = args.get(4) {
        if let Err(e) = rowsweep_io::write_grid_file(path, &outcome.grid) {
            error!("cannot write {path}: {e}");
            return ExitCode::FAILURE;
        }
        info!("grid written to {path}");
    }
    ExitCode::SUCCESS
}
