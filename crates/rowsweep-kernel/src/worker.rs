//! Per-partition row computation.

use std::fmt;

use rowsweep_core::{GridError, Transform, WorkerId};
use rowsweep_space::Partition;

use crate::stencil::{RowSource, Stencil};

/// Computes one partition's segment of a row.
///
/// A worker only ever writes the columns of its own [`Partition`], but
/// reads the *full* source row: `j + offset` may land in another
/// worker's partition. Edge columns are resolved through the stencil's
/// [`EdgePolicy`](rowsweep_space::EdgePolicy), identically for every
/// partition.
pub struct Worker<'t> {
    partition: Partition,
    cols: usize,
    stencil: Stencil,
    transform: &'t dyn Transform,
}

impl fmt::Debug for Worker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("partition", &self.partition)
            .field("cols", &self.cols)
            .field("stencil", &self.stencil)
            .field("transform", &self.transform.name())
            .finish()
    }
}

impl<'t> Worker<'t> {
    /// Create a worker for `partition` of a `cols`-wide grid.
    pub fn new(
        partition: Partition,
        cols: usize,
        stencil: Stencil,
        transform: &'t dyn Transform,
    ) -> Self {
        Self {
            partition,
            cols,
            stencil,
            transform,
        }
    }

    /// A single worker owning every column, used by the unpartitioned
    /// reference sweep.
    pub fn full_width(cols: usize, stencil: Stencil, transform: &'t dyn Transform) -> Self {
        let partition = Partition {
            worker: WorkerId(0),
            start: 0,
            end: cols,
        };
        Self::new(partition, cols, stencil, transform)
    }

    /// Id of the owning worker.
    pub fn id(&self) -> WorkerId {
        self.partition.worker
    }

    /// The owned column range.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Compute the owned segment of one row in place.
    ///
    /// `segment` holds the current values of the owned columns on entry
    /// and the updated values on return; cells whose neighbour is
    /// skipped by the edge policy are left untouched. `source` is the
    /// full source row for [`RowSource::Previous`] and
    /// [`RowSource::Next`] stencils and is ignored for
    /// [`RowSource::Current`].
    ///
    /// Returns the number of cells written.
    pub fn compute_segment(
        &self,
        source: Option<&[f64]>,
        segment: &mut [f64],
    ) -> Result<usize, GridError> {
        if segment.len() != self.partition.len() {
            return Err(GridError::LengthMismatch {
                expected: self.partition.len(),
                actual: segment.len(),
            });
        }

        if self.stencil.source == RowSource::Current {
            for cell in segment.iter_mut() {
                *cell = self.transform.apply(*cell);
            }
            return Ok(segment.len());
        }

        let source = match source {
            Some(s) if s.len() == self.cols => s,
            other => {
                return Err(GridError::LengthMismatch {
                    expected: self.cols,
                    actual: other.map_or(0, <[f64]>::len),
                })
            }
        };

        let Stencil { offset, edge, .. } = self.stencil;
        let mut written = 0;
        for (cell, col) in segment.iter_mut().zip(self.partition.range()) {
            if let Some(src) = edge.resolve(col, offset, self.cols) {
                *cell = self.transform.apply(source[src]);
                written += 1;
            }
        }
        Ok(written)
    }

    /// Compute the owned columns of a full-width row in place.
    pub fn compute_in_row(
        &self,
        source: Option<&[f64]>,
        row: &mut [f64],
    ) -> Result<usize, GridError> {
        if row.len() != self.cols {
            return Err(GridError::LengthMismatch {
                expected: self.cols,
                actual: row.len(),
            });
        }
        self.compute_segment(source, &mut row[self.partition.range()])
    }
}
