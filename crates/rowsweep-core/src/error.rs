//! Error types for a rowsweep run.
//!
//! Organized by subsystem: configuration (fatal at startup), allocation
//! (fatal at startup), grid row state, and communication (aborts the
//! whole run). Result persistence has its own error type in
//! `rowsweep-io` because it never affects the computed grid.

use std::error::Error;
use std::fmt;

use crate::id::{RowIndex, WorkerId};

/// Invalid run configuration, detected before any grid is allocated.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A grid dimension is zero.
    ZeroDimension {
        /// Which dimension (`"rows"` or `"cols"`).
        name: &'static str,
    },
    /// The worker count is zero.
    NoWorkers,
    /// More workers than columns: some partition would be empty.
    TooManyWorkers {
        /// Configured worker count.
        workers: usize,
        /// Number of grid columns.
        cols: usize,
    },
    /// The stencil is not valid for this grid.
    InvalidStencil {
        /// Description of the problem.
        reason: String,
    },
    /// A worker id outside `0..workers` was named (e.g. as coordinator).
    UnknownWorker {
        /// The offending id.
        worker: WorkerId,
        /// Configured worker count.
        workers: usize,
    },
    /// The receive timeout is zero.
    ZeroTimeout,
    /// The initializer produced a non-finite value.
    NonFiniteInitialValue {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
        /// The value produced.
        value: f64,
    },
    /// A supplied grid does not have the configured shape.
    ShapeMismatch {
        /// Configured `(rows, cols)`.
        expected: (usize, usize),
        /// Supplied `(rows, cols)`.
        actual: (usize, usize),
    },
    /// The worker thread pool could not be built.
    ThreadPoolBuildFailed {
        /// Description from the pool builder.
        reason: String,
    },
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { name } => write!(f, "grid {name} must be at least 1"),
            Self::NoWorkers => write!(f, "worker count must be at least 1"),
            Self::TooManyWorkers { workers, cols } => {
                write!(f, "worker count {workers} exceeds column count {cols}")
            }
            Self::InvalidStencil { reason } => write!(f, "invalid stencil: {reason}"),
            Self::UnknownWorker { worker, workers } => {
                write!(f, "worker {worker} is outside 0..{workers}")
            }
            Self::ZeroTimeout => write!(f, "receive timeout must be non-zero"),
            Self::NonFiniteInitialValue { row, col, value } => {
                write!(f, "initial value at ({row}, {col}) is not finite: {value}")
            }
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "grid shape {}x{} does not match configured {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::ThreadPoolBuildFailed { reason } => {
                write!(f, "thread pool build failed: {reason}")
            }
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// The grid buffer could not be acquired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocationError {
    /// `rows * cols` overflows `usize`.
    SizeOverflow {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },
    /// The allocator refused the reservation.
    ReservationFailed {
        /// Number of `f64` cells requested.
        cells: usize,
    },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeOverflow { rows, cols } => {
                write!(f, "grid size {rows}x{cols} overflows usize")
            }
            Self::ReservationFailed { cells } => {
                write!(f, "failed to reserve {cells} grid cells")
            }
        }
    }
}

impl Error for AllocationError {}

/// A grid row was accessed in a state that does not permit it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// Row index past the last row.
    RowOutOfBounds {
        /// Requested row.
        row: RowIndex,
        /// Number of rows in the grid.
        rows: usize,
    },
    /// The row is mid-write and may be partially updated.
    RowNotReadable {
        /// Requested row.
        row: RowIndex,
    },
    /// Another row is already open for writing.
    RowBusy {
        /// Row that was requested.
        requested: RowIndex,
        /// Row that is still open.
        open: RowIndex,
    },
    /// A row or buffer has the wrong number of values.
    LengthMismatch {
        /// Expected number of values.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowOutOfBounds { row, rows } => {
                write!(f, "row {row} out of bounds for {rows} rows")
            }
            Self::RowNotReadable { row } => {
                write!(f, "row {row} is being written and cannot be read")
            }
            Self::RowBusy { requested, open } => {
                write!(f, "cannot open row {requested}: row {open} is still open")
            }
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} values, got {actual}")
            }
        }
    }
}

impl Error for GridError {}

/// A partition failed to produce or receive its row data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommunicationError {
    /// Expected segments did not arrive within the receive timeout.
    Timeout {
        /// Row being exchanged.
        row: RowIndex,
        /// Workers whose data never arrived.
        unreachable: Vec<WorkerId>,
        /// How long the receiver waited, in milliseconds.
        waited_ms: u64,
    },
    /// The peer's channel closed mid-run.
    Disconnected {
        /// Row being exchanged, if known.
        row: Option<RowIndex>,
        /// The peer that went away.
        peer: WorkerId,
    },
    /// A message did not match the protocol expectations.
    Malformed {
        /// Row being exchanged.
        row: RowIndex,
        /// Sender of the bad message.
        sender: WorkerId,
        /// What was wrong with it.
        reason: String,
    },
    /// Another worker aborted the run.
    Aborted {
        /// Row at which the abort was observed.
        row: RowIndex,
        /// Worker that initiated the abort.
        origin: WorkerId,
    },
}

impl fmt::Display for CommunicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout {
                row,
                unreachable,
                waited_ms,
            } => {
                write!(f, "partition unreachable at row {row}: no data from worker(s) ")?;
                for (n, w) in unreachable.iter().enumerate() {
                    if n > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{w}")?;
                }
                write!(f, " within {waited_ms} ms")
            }
            Self::Disconnected { row, peer } => {
                write!(f, "worker {peer} disconnected")?;
                if let Some(r) = row {
                    write!(f, " at row {r}")?;
                }
                Ok(())
            }
            Self::Malformed {
                row,
                sender,
                reason,
            } => write!(f, "malformed message from worker {sender} at row {row}: {reason}"),
            Self::Aborted { row, origin } => {
                write!(f, "run aborted by worker {origin} at row {row}")
            }
        }
    }
}

impl Error for CommunicationError {}

/// Coarse classification of a [`SweepError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid configuration or topology input.
    Configuration,
    /// Grid buffer could not be acquired.
    Allocation,
    /// Inter-worker exchange failed.
    Communication,
}

/// Top-level error returned by a sweep.
#[derive(Clone, Debug, PartialEq)]
pub enum SweepError {
    /// Invalid configuration.
    Config(ConfigError),
    /// Grid allocation failed.
    Allocation(AllocationError),
    /// Row exchange failed; the run was aborted on every worker.
    Communication(CommunicationError),
    /// A row was not in the version state the row barrier requires.
    Grid(GridError),
    /// A worker thread panicked (typically inside the transform).
    WorkerPanicked {
        /// The worker whose thread panicked.
        worker: WorkerId,
    },
}

impl SweepError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Allocation(_) => ErrorKind::Allocation,
            Self::Communication(_) | Self::Grid(_) | Self::WorkerPanicked { .. } => {
                ErrorKind::Communication
            }
        }
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Allocation(e) => write!(f, "allocation: {e}"),
            Self::Communication(e) => write!(f, "communication: {e}"),
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::WorkerPanicked { worker } => write!(f, "worker {worker} panicked"),
        }
    }
}

impl Error for SweepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Allocation(e) => Some(e),
            Self::Communication(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::WorkerPanicked { .. } => None,
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<AllocationError> for SweepError {
    fn from(e: AllocationError) -> Self {
        Self::Allocation(e)
    }
}

impl From<CommunicationError> for SweepError {
    fn from(e: CommunicationError) -> Self {
        Self::Communication(e)
    }
}

impl From<GridError> for SweepError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}
