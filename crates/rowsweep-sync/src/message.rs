//! Messages exchanged between workers.

use std::sync::Arc;

use rowsweep_core::{RowIndex, WorkerId};

/// One worker's computed column segment of a row.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Worker that computed the segment.
    pub sender: WorkerId,
    /// Row the segment belongs to.
    pub row: RowIndex,
    /// First column covered by `values`.
    pub start: usize,
    /// Values of columns `start..start + values.len()`.
    pub values: Vec<f64>,
}

/// Participant → coordinator.
#[derive(Clone, Debug, PartialEq)]
pub enum Upstream {
    /// A computed segment.
    Segment(Segment),
    /// The participant failed and the run must stop.
    Abort {
        /// Worker that initiated the abort.
        origin: WorkerId,
        /// Row at which it failed.
        row: RowIndex,
    },
}

/// Coordinator → participant.
#[derive(Clone, Debug, PartialEq)]
pub enum Downstream {
    /// The merged row, shared immutably by every participant.
    Row {
        /// Row index.
        row: RowIndex,
        /// All `cols` values of the row.
        values: Arc<[f64]>,
    },
    /// The run is aborted.
    Abort {
        /// Worker that initiated the abort.
        origin: WorkerId,
        /// Row at which it failed.
        row: RowIndex,
    },
    /// Every row has been merged; participants may exit.
    Complete,
}
