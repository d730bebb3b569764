//! Mutable grid storage with per-row version tracking.

use rowsweep_core::{GridError, Initializer, RowIndex, SweepError};

use crate::alloc::reserve_cells;
use crate::grid::Grid;

/// Version state of one grid row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowState {
    /// Holds the external initial condition; not written in this run.
    Initial,
    /// Open for writing through a [`RowGuard`]; may be partially updated.
    InProgress,
    /// Fully written and merged.
    Finalized,
}

impl RowState {
    /// Whether readers may observe this row.
    pub fn is_readable(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Owns the grid buffer for the duration of a sweep.
///
/// At most one row is [`RowState::InProgress`] at any time. A row is
/// opened with [`begin_row`](Self::begin_row) or
/// [`begin_row_from`](Self::begin_row_from) and finalized by
/// [`RowGuard::commit`]. Dropping a guard without committing leaves its
/// row `InProgress`: the store is then poisoned, and every later read of
/// that row, attempt to open another row, or [`finish`](Self::finish)
/// fails.
pub struct GridStore {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
    states: Vec<RowState>,
    open: Option<RowIndex>,
}

impl GridStore {
    /// Wrap an initialized grid. Every row starts [`RowState::Initial`].
    pub fn new(grid: Grid) -> Self {
        let (rows, cols) = grid.shape();
        Self {
            rows,
            cols,
            data: grid.into_vec(),
            states: vec![RowState::Initial; rows],
            open: None,
        }
    }

    /// Allocate and initialize a store from `init`.
    ///
    /// See [`Grid::from_initializer`] for the failure modes.
    pub fn from_initializer<I>(rows: usize, cols: usize, init: &I) -> Result<Self, SweepError>
    where
        I: Initializer + ?Sized,
    {
        Ok(Self::new(Grid::from_initializer(rows, cols, init)?))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Version state of `row`, or `None` if out of range.
    pub fn state(&self, row: RowIndex) -> Option<RowState> {
        self.states.get(row.0).copied()
    }

    /// The row currently open for writing, if any.
    pub fn open_row(&self) -> Option<RowIndex> {
        self.open
    }

    /// Read a row that is not mid-write.
    ///
    /// Both [`RowState::Initial`] and [`RowState::Finalized`] rows are
    /// readable; an `InProgress` row yields
    /// [`GridError::RowNotReadable`].
    pub fn finalized_row(&self, row: RowIndex) -> Result<&[f64], GridError> {
        self.check_bounds(row)?;
        if !self.states[row.0].is_readable() {
            return Err(GridError::RowNotReadable { row });
        }
        let start = row.0 * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    /// Open `row` for in-place writing with no separate source row.
    pub fn begin_row(&mut self, row: RowIndex) -> Result<RowGuard<'_>, GridError> {
        self.check_bounds(row)?;
        self.check_idle(row)?;
        let cols = self.cols;
        let start = row.0 * cols;
        self.states[row.0] = RowState::InProgress;
        self.open = Some(row);
        Ok(RowGuard {
            row,
            source: None,
            values: &mut self.data[start..start + cols],
            state: &mut self.states[row.0],
            open: &mut self.open,
        })
    }

    /// Open `row` for writing while borrowing `source` for reading.
    ///
    /// `source` must be a different, readable row.
    pub fn begin_row_from(
        &mut self,
        row: RowIndex,
        source: RowIndex,
    ) -> Result<RowGuard<'_>, GridError> {
        self.check_bounds(row)?;
        self.check_bounds(source)?;
        self.check_idle(row)?;
        if source == row || !self.states[source.0].is_readable() {
            return Err(GridError::RowNotReadable { row: source });
        }

        let cols = self.cols;
        self.states[row.0] = RowState::InProgress;
        self.open = Some(row);

        let (src, dst) = if source.0 < row.0 {
            let (lo, hi) = self.data.split_at_mut(row.0 * cols);
            let src: &[f64] = &lo[source.0 * cols..source.0 * cols + cols];
            (src, &mut hi[..cols])
        } else {
            let (lo, hi) = self.data.split_at_mut(source.0 * cols);
            let src: &[f64] = &hi[..cols];
            (src, &mut lo[row.0 * cols..row.0 * cols + cols])
        };

        Ok(RowGuard {
            row,
            source: Some(src),
            values: dst,
            state: &mut self.states[row.0],
            open: &mut self.open,
        })
    }

    /// Overwrite `row` with an already merged row and finalize it.
    pub fn install_row(&mut self, row: RowIndex, values: &[f64]) -> Result<(), GridError> {
        if values.len() != self.cols {
            return Err(GridError::LengthMismatch {
                expected: self.cols,
                actual: values.len(),
            });
        }
        let mut guard = self.begin_row(row)?;
        guard.values_mut().copy_from_slice(values);
        guard.commit();
        Ok(())
    }

    /// Copy the current contents into a [`Grid`] without consuming the
    /// store. Fails if a row is open or the copy cannot be allocated.
    pub fn snapshot(&self) -> Result<Grid, SweepError> {
        if let Some(row) = self.open {
            return Err(GridError::RowNotReadable { row }.into());
        }
        let mut data = reserve_cells(self.rows, self.cols)?;
        data.extend_from_slice(&self.data);
        Ok(Grid::from_vec(self.rows, self.cols, data)?)
    }

    /// End the sweep and release the read-only result.
    pub fn finish(self) -> Result<Grid, GridError> {
        if let Some(row) = self.open {
            return Err(GridError::RowNotReadable { row });
        }
        Grid::from_vec(self.rows, self.cols, self.data)
    }

    fn check_bounds(&self, row: RowIndex) -> Result<(), GridError> {
        if row.0 >= self.rows {
            return Err(GridError::RowOutOfBounds {
                row,
                rows: self.rows,
            });
        }
        Ok(())
    }

    fn check_idle(&self, requested: RowIndex) -> Result<(), GridError> {
        match self.open {
            Some(open) => Err(GridError::RowBusy { requested, open }),
            None => Ok(()),
        }
    }
}

/// Exclusive write access to one [`RowState::InProgress`] row.
///
/// The guard holds the only mutable borrow of the store, so nothing else
/// can read the row while it is partially written.
#[must_use = "a row guard must be committed to finalize its row"]
pub struct RowGuard<'a> {
    row: RowIndex,
    source: Option<&'a [f64]>,
    values: &'a mut [f64],
    state: &'a mut RowState,
    open: &'a mut Option<RowIndex>,
}

impl<'a> RowGuard<'a> {
    /// The row being written.
    pub fn row(&self) -> RowIndex {
        self.row
    }

    /// The borrowed source row, if opened with
    /// [`GridStore::begin_row_from`].
    pub fn source(&self) -> Option<&[f64]> {
        self.source
    }

    /// Current contents of the row being written.
    pub fn values(&self) -> &[f64] {
        &*self.values
    }

    /// Mutable contents of the row being written.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut *self.values
    }

    /// Source row and destination row at once.
    pub fn parts_mut(&mut self) -> (Option<&[f64]>, &mut [f64]) {
        (self.source, &mut *self.values)
    }

    /// Finalize the row and release the store.
    pub fn commit(self) {
        *self.state = RowState::Finalized;
        *self.open = None;
    }
}
