//! Sweep engine for rowsweep.
//!
//! [`SweepEngine`] owns the outer row loop. It validates a
//! [`SweepConfig`], builds the grid from an
//! [`Initializer`](rowsweep_core::Initializer), runs one of three
//! executors, and returns the finished grid with timing metrics:
//!
//! - [`ExecutionMode::MessagePassing`]: one thread per worker, each with
//!   a private grid copy; rows are merged through the coordinator
//!   protocol in `rowsweep-sync`.
//! - [`ExecutionMode::SharedMemory`]: one grid, a rayon pool; each row's
//!   partitions are computed in parallel over disjoint slices.
//! - [`ExecutionMode::Sequential`]: the single-threaded reference.
//!
//! All three produce bit-identical grids for the same inputs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
mod distributed;
pub mod engine;
pub mod hooks;
pub mod metrics;
mod sequential;
mod shared;

pub use config::{ExecutionMode, SweepConfig};
pub use engine::{SweepEngine, SweepOutcome};
pub use hooks::{NoHooks, SweepHooks};
pub use metrics::SweepMetrics;
