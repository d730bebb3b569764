//! Strongly-typed identifiers for workers and grid rows.

use std::fmt;

/// Identifies a worker (an execution unit owning one partition).
///
/// Workers are numbered `0..worker_count` in partition order:
/// `WorkerId(n)` owns the n-th column range of the partition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl WorkerId {
    /// The id as a `usize`, for indexing per-worker tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of a grid row.
///
/// Rows are processed strictly in increasing index order during a
/// carried sweep; row messages are tagged with the row they belong to
/// so that a late or early segment is detected rather than merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowIndex(pub usize);

impl RowIndex {
    /// The following row.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for RowIndex {
    fn from(v: usize) -> Self {
        Self(v)
    }
}
