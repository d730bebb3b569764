//! Benchmark profiles for the rowsweep engine.
//!
//! - [`reference_config`]: the classic 5000 × 5000 sweep
//! - [`bench_config`]: a square grid of any size, for criterion runs
//! - [`classic_stencils`]: the three loop shapes the engine reproduces

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rowsweep_engine::{ExecutionMode, SweepConfig};
use rowsweep_kernel::{ScaledSine, Stencil};

/// Side length of the reference grid.
pub const REFERENCE_SIZE: usize = 5000;

/// The reference run: 5000 × 5000, carried `+1` offset, skipped edge.
pub fn reference_config(workers: usize, mode: ExecutionMode) -> SweepConfig {
    bench_config(REFERENCE_SIZE, workers, mode)
}

/// A `size × size` carried sweep.
pub fn bench_config(size: usize, workers: usize, mode: ExecutionMode) -> SweepConfig {
    SweepConfig::new(size, size)
        .with_workers(workers)
        .with_mode(mode)
}

/// `(label, stencil, transform)` for the three classic loops:
/// `sin(2 * a[i-1][j+1])`, `sin(0.2 * a[i+1][j-6])`, and `sin(2 * a[i][j])`.
pub fn classic_stencils() -> [(&'static str, Stencil, ScaledSine); 3] {
    [
        ("carried", Stencil::carried(1), ScaledSine::new(2.0)),
        ("lookahead", Stencil::lookahead(-6), ScaledSine::new(0.2)),
        ("pointwise", Stencil::pointwise(), ScaledSine::new(2.0)),
    ]
}
