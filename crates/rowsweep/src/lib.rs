//! rowsweep: row-sequential grid sweeps with partitioned execution.
//!
//! A sweep rewrites a 2-D grid one row at a time,
//! `a[i][j] = f(a[src(i)][j + offset])`. The columns are split among
//! workers; after every row the coordinator gathers each worker's
//! segment, merges the full row, and broadcasts it back before anyone
//! starts the next row. This facade re-exports the sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use rowsweep::prelude::*;
//!
//! // The classic loop a[i][j] = sin(2 * a[i-1][j+1]) on a 32 × 32 ramp,
//! // split across 4 message-passing workers.
//! let config = SweepConfig::new(32, 32)
//!     .with_workers(4)
//!     .with_mode(ExecutionMode::MessagePassing);
//! let engine = SweepEngine::new(config, ScaledSine::new(2.0)).unwrap();
//! let outcome = engine.run(&LinearRamp::default()).unwrap();
//!
//! let expected = (2.0f64 * LinearRamp::default().value(0, 1)).sin();
//! assert_eq!(outcome.grid.get(1, 0), Some(expected));
//! // the last column has no right neighbour and keeps its initial value
//! assert_eq!(outcome.grid.get(1, 31), Some(41.0));
//!
//! let mut text = Vec::new();
//! let mut writer = GridWriter::new(&mut text, 32);
//! writer.write_grid(&outcome.grid).unwrap();
//! assert_eq!(writer.rows_written(), 32);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rowsweep-core` | IDs, errors, `Transform` and `Initializer` traits |
//! | [`space`] | `rowsweep-space` | Edge policies, partition scheme, roles |
//! | [`grid`] | `rowsweep-grid` | `GridStore` with row versions, the finished `Grid` |
//! | [`kernel`] | `rowsweep-kernel` | Stencils, the per-partition `Worker`, reference transforms |
//! | [`sync`] | `rowsweep-sync` | Row gather/merge/broadcast protocol |
//! | [`engine`] | `rowsweep-engine` | `SweepEngine`, configuration, metrics, hooks |
//! | [`io`] | `rowsweep-io` | Text persistence |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core IDs, error taxonomy, and collaborator traits (`rowsweep-core`).
pub use rowsweep_core as types;

/// Column partitioning and edge handling (`rowsweep-space`).
///
/// [`space::PartitionScheme`] splits the columns and hands the
/// [`space::CanMerge`] capability to exactly one worker.
pub use rowsweep_space as space;

/// Grid storage (`rowsweep-grid`).
pub use rowsweep_grid as grid;

/// Row computation (`rowsweep-kernel`).
pub use rowsweep_kernel as kernel;

/// Row synchronization protocol (`rowsweep-sync`).
///
/// Most users never touch this directly; the message-passing executor
/// drives it.
pub use rowsweep_sync as sync;

/// The sweep engine (`rowsweep-engine`).
pub use rowsweep_engine as engine;

/// Text persistence (`rowsweep-io`).
pub use rowsweep_io as io;

/// Common imports for typical rowsweep usage.
///
/// ```rust
/// use rowsweep::prelude::*;
/// ```
pub mod prelude {
    // Core traits and ids
    pub use rowsweep_core::{Initializer, RowIndex, Transform, WorkerId};

    // Errors
    pub use rowsweep_core::{
        AllocationError, CommunicationError, ConfigError, ErrorKind, GridError, SweepError,
    };

    // Space and grid
    pub use rowsweep_grid::Grid;
    pub use rowsweep_space::{EdgePolicy, PartitionScheme};

    // Kernel
    pub use rowsweep_kernel::{transform_fn, Identity, LinearRamp, ScaledSine, Stencil};

    // Engine
    pub use rowsweep_engine::{
        ExecutionMode, SweepConfig, SweepEngine, SweepHooks, SweepMetrics, SweepOutcome,
    };

    // Persistence
    pub use rowsweep_io::{read_grid_file, write_grid_file, GridWriter, PersistError};
}
