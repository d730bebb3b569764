//! Which row and column a cell reads.

use std::ops::Range;

use rowsweep_core::{ConfigError, RowIndex};
use rowsweep_space::EdgePolicy;

/// The row a cell's input comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowSource {
    /// `a[i][j] = f(a[i-1][j+off])`: reads the already-updated previous
    /// row. Rows `1..rows` are written, strictly in order.
    Previous,
    /// `a[i][j] = f(a[i+1][j+off])`: reads the next row, which has not
    /// been written yet, so every source is a pre-sweep value. Rows
    /// `0..rows-1` are written.
    Next,
    /// `a[i][j] = f(a[i][j])`: pointwise. Every row is written and the
    /// offset must be zero.
    Current,
}

/// Row source, column offset, and edge policy of a sweep.
///
/// # Examples
///
/// ```
/// use rowsweep_kernel::{RowSource, Stencil};
/// use rowsweep_space::EdgePolicy;
///
/// let s = Stencil::carried(1);
/// assert_eq!(s.source, RowSource::Previous);
/// assert_eq!(s.edge, EdgePolicy::Skip);
/// assert!(s.is_carried());
/// assert_eq!(s.target_rows(4), 1..4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Stencil {
    /// Row the input comes from.
    pub source: RowSource,
    /// Column offset of the input relative to the written cell.
    pub offset: isize,
    /// What to do when `j + offset` falls outside the grid.
    pub edge: EdgePolicy,
}

impl Default for Stencil {
    fn default() -> Self {
        Self::carried(1)
    }
}

impl Stencil {
    /// Previous-row dependency with the given column offset.
    pub fn carried(offset: isize) -> Self {
        Self {
            source: RowSource::Previous,
            offset,
            edge: EdgePolicy::Skip,
        }
    }

    /// Next-row dependency with the given column offset.
    pub fn lookahead(offset: isize) -> Self {
        Self {
            source: RowSource::Next,
            offset,
            edge: EdgePolicy::Skip,
        }
    }

    /// Pointwise update of every cell.
    pub fn pointwise() -> Self {
        Self {
            source: RowSource::Current,
            offset: 0,
            edge: EdgePolicy::Skip,
        }
    }

    /// Replace the edge policy.
    pub fn with_edge(mut self, edge: EdgePolicy) -> Self {
        self.edge = edge;
        self
    }

    /// Whether each row depends on the row written just before it.
    ///
    /// Only carried stencils need the full-row broadcast barrier.
    pub fn is_carried(&self) -> bool {
        matches!(self.source, RowSource::Previous)
    }

    /// Check that the stencil is internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source == RowSource::Current && self.offset != 0 {
            return Err(ConfigError::InvalidStencil {
                reason: format!(
                    "pointwise stencil reads its own cell, offset must be 0 (got {})",
                    self.offset
                ),
            });
        }
        Ok(())
    }

    /// Rows written by a sweep over `rows` rows, in processing order.
    pub fn target_rows(&self, rows: usize) -> Range<usize> {
        match self.source {
            RowSource::Previous => 1.min(rows)..rows,
            RowSource::Next => 0..rows.saturating_sub(1),
            RowSource::Current => 0..rows,
        }
    }

    /// Source row for target row `row`, or `None` for pointwise stencils.
    pub fn source_row(&self, row: RowIndex) -> Option<RowIndex> {
        match self.source {
            RowSource::Previous => row.0.checked_sub(1).map(RowIndex),
            RowSource::Next => Some(row.next()),
            RowSource::Current => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_rows_per_source() {
        assert_eq!(Stencil::carried(1).target_rows(5), 1..5);
        assert_eq!(Stencil::lookahead(-6).target_rows(5), 0..4);
        assert_eq!(Stencil::pointwise().target_rows(5), 0..5);
    }

    #[test]
    fn single_row_grid_has_no_dependent_targets() {
        assert!(Stencil::carried(1).target_rows(1).is_empty());
        assert!(Stencil::lookahead(1).target_rows(1).is_empty());
        assert_eq!(Stencil::pointwise().target_rows(1), 0..1);
    }

    #[test]
    fn source_rows() {
        assert_eq!(
            Stencil::carried(0).source_row(RowIndex(3)),
            Some(RowIndex(2))
        );
        assert_eq!(Stencil::carried(0).source_row(RowIndex(0)), None);
        assert_eq!(
            Stencil::lookahead(0).source_row(RowIndex(3)),
            Some(RowIndex(4))
        );
        assert_eq!(Stencil::pointwise().source_row(RowIndex(3)), None);
    }

    #[test]
    fn pointwise_with_offset_is_invalid() {
        let mut s = Stencil::pointwise();
        assert!(s.validate().is_ok());
        s.offset = 2;
        match s.validate() {
            Err(ConfigError::InvalidStencil { reason }) => assert!(reason.contains("offset")),
            other => panic!("expected InvalidStencil, got {other:?}"),
        }
    }

    #[test]
    fn only_previous_is_carried() {
        assert!(Stencil::carried(1).is_carried());
        assert!(!Stencil::lookahead(1).is_carried());
        assert!(!Stencil::pointwise().is_carried());
    }

    #[test]
    fn default_is_the_carried_plus_one_sweep() {
        let s = Stencil::default();
        assert_eq!(s, Stencil::carried(1));
        assert_eq!(s.edge, EdgePolicy::Skip);
    }
}
