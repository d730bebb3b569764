//! The completed, read-only grid.

use std::slice::ChunksExact;

use rowsweep_core::{AllocationError, ConfigError, GridError, Initializer, SweepError};

use crate::alloc::reserve_cells;

/// A dense row-major `rows × cols` grid of `f64`.
///
/// This is both the input to a sweep (an initialized grid) and its
/// result. It has no row-version state; mutation during a sweep happens
/// inside a [`GridStore`](crate::GridStore).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Build a grid from a row-major buffer.
    ///
    /// Fails with [`GridError::LengthMismatch`] if `data.len()` is not
    /// `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, GridError> {
        let expected = rows.checked_mul(cols).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Allocate a grid and populate every cell from `init`.
    ///
    /// Zero dimensions are a configuration error, as is any non-finite
    /// initial value. Allocation is fallible and reports
    /// [`AllocationError`](rowsweep_core::AllocationError) instead of
    /// aborting.
    pub fn from_initializer<I>(rows: usize, cols: usize, init: &I) -> Result<Self, SweepError>
    where
        I: Initializer + ?Sized,
    {
        if rows == 0 {
            return Err(ConfigError::ZeroDimension { name: "rows" }.into());
        }
        if cols == 0 {
            return Err(ConfigError::ZeroDimension { name: "cols" }.into());
        }
        let mut data = reserve_cells(rows, cols)?;
        for row in 0..rows {
            for col in 0..cols {
                let value = init.value(row, col);
                if !value.is_finite() {
                    return Err(ConfigError::NonFiniteInitialValue { row, col, value }.into());
                }
                data.push(value);
            }
        }
        Ok(Self { rows, cols, data })
    }

    /// Copy the grid through the fallible allocation path.
    ///
    /// Unlike [`Clone::clone`], running out of memory is reported as an
    /// [`AllocationError`] instead of aborting the process.
    pub fn try_clone(&self) -> Result<Self, AllocationError> {
        let mut data = reserve_cells(self.rows, self.cols)?;
        data.extend_from_slice(&self.data);
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row `i`, or `None` if out of range.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.rows {
            return None;
        }
        let start = i * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    /// Cell `(i, j)`, or `None` if out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if j >= self.cols {
            return None;
        }
        self.row(i).map(|r| r[j])
    }

    /// The whole grid as a row-major slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Iterate over rows in order.
    pub fn iter_rows(&self) -> ChunksExact<'_, f64> {
        self.data.chunks_exact(self.cols.max(1))
    }

    /// Consume the grid, returning the row-major buffer.
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(i: usize, j: usize) -> f64 {
        (10 * i + j) as f64
    }

    #[test]
    fn initializer_fills_row_major() {
        let g = Grid::from_initializer(3, 4, &ramp).unwrap();
        assert_eq!(g.shape(), (3, 4));
        assert_eq!(g.row(2).unwrap(), &[20.0, 21.0, 22.0, 23.0]);
        assert_eq!(g.get(1, 3), Some(13.0));
        assert_eq!(g.as_slice().len(), 12);
    }

    #[test]
    fn out_of_range_access_is_none() {
        let g = Grid::from_initializer(2, 2, &ramp).unwrap();
        assert!(g.row(2).is_none());
        assert!(g.get(0, 2).is_none());
        assert!(g.get(2, 0).is_none());
    }

    #[test]
    fn iter_rows_yields_every_row() {
        let g = Grid::from_initializer(3, 2, &ramp).unwrap();
        let firsts: Vec<f64> = g.iter_rows().map(|r| r[0]).collect();
        assert_eq!(firsts, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn non_finite_initial_value_rejected() {
        let init = |i: usize, j: usize| if (i, j) == (1, 1) { f64::NAN } else { 0.0 };
        match Grid::from_initializer(2, 2, &init) {
            Err(SweepError::Config(ConfigError::NonFiniteInitialValue { row: 1, col: 1, .. })) => {}
            other => panic!("expected NonFiniteInitialValue, got {other:?}"),
        }
    }

    #[test]
    fn zero_dimensions_rejected() {
        match Grid::from_initializer(0, 4, &ramp) {
            Err(SweepError::Config(ConfigError::ZeroDimension { name: "rows" })) => {}
            other => panic!("expected ZeroDimension(rows), got {other:?}"),
        }
        match Grid::from_initializer(4, 0, &ramp) {
            Err(SweepError::Config(ConfigError::ZeroDimension { name: "cols" })) => {}
            other => panic!("expected ZeroDimension(cols), got {other:?}"),
        }
    }

    #[test]
    fn oversized_grid_reports_allocation_error() {
        match Grid::from_initializer(usize::MAX, 2, &ramp) {
            Err(SweepError::Allocation(AllocationError::SizeOverflow { .. })) => {}
            other => panic!("expected SizeOverflow, got {other:?}"),
        }
    }

    #[test]
    fn try_clone_copies_into_an_exact_buffer() {
        let g = Grid::from_initializer(3, 5, &ramp).unwrap();
        let copy = g.try_clone().unwrap();
        assert_eq!(copy, g);
        let data = copy.into_vec();
        assert_eq!(data.len(), 15);
        assert_eq!(data.capacity(), 15);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Grid::from_vec(2, 2, vec![0.0; 4]).is_ok());
        assert_eq!(
            Grid::from_vec(2, 2, vec![0.0; 3]),
            Err(GridError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
    }
}
